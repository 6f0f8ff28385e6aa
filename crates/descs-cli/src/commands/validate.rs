use crate::cli::ValidateArgs;
use crate::error::Result;
use descs::core::contact::ContactExpression;

/// Parses the expression and prints its canonical form.
pub fn run(args: ValidateArgs) -> Result<()> {
    let expression = ContactExpression::parse(&args.expression, args.molecule_type)?;
    println!("valid {} expression: {}", args.molecule_type, expression);
    Ok(())
}

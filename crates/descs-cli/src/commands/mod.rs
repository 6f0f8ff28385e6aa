pub mod build;
pub mod compare;
pub mod validate;

use crate::utils::progress::CliProgressHandler;

pub(crate) fn progress_handler(quiet: bool) -> CliProgressHandler {
    if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    }
}

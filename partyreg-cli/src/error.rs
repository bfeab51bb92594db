use std::io;

use thiserror::Error;

use crate::client_manager::ClientManagerError;
use crate::settings::SettingsError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Client(#[from] ClientManagerError),

    /// Shown with the message meant for users.
    #[error("{}", .0.user_message())]
    Api(#[from] partyreg_lib::error::Error),

    #[error("{0}")]
    Usage(String),

    /// The form did not validate; details were printed with it.
    #[error("the {0} form has errors")]
    Invalid(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

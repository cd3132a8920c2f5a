pub(crate) mod callback;
pub(crate) mod command;
pub(crate) mod util;

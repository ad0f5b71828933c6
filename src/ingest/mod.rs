pub(crate) mod canonical;
pub(crate) mod context;
pub(crate) mod epoch;
pub(crate) mod pipeline;
pub(crate) mod reader;
pub(crate) mod users;

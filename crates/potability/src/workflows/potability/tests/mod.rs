mod common;
mod dataset;
mod session;

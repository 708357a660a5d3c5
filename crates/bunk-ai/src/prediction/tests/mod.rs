mod common;
mod statistical;

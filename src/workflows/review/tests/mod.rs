mod common;
mod directory;
mod scheduler;

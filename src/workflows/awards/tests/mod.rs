mod common;
mod loader;
mod resolver;

mod advisory;
mod common;
mod routing;

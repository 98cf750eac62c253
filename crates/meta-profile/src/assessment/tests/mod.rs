mod aggregate;
mod common;
mod routing;

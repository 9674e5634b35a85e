mod admission;
mod analytics;
mod server;

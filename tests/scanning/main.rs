mod generated;
mod plugins;
mod samples;
mod statements;
mod tokens;

pub mod ask;
pub mod probes;

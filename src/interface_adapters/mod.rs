// Interface adapters: wire DTOs, setup files and the JSON-lines bridge.

pub mod protocol;
pub mod setup;
pub mod stdio;

use serde::Serialize;

/// Liveness payload; does not reflect store health.
#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Body returned by the store probe on `/`.
#[derive(Serialize, Debug)]
pub struct RunningMessage {
    pub msg: String,
}

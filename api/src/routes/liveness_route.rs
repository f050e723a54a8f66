/// GET /: liveness probe.
pub async fn liveness() -> &'static str {
    "Function executed successfully!"
}

/// `GET /` greeting.
pub async fn index_handler() -> &'static str {
    "ltsv-access-log\n"
}

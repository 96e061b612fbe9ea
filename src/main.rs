#[tokio::main]
async fn main() {
    let code = subpool::app::startup::startup().await;
    std::process::exit(code);
}

use bijou::App;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    bijou::logging::init_logging();

    let app = App::new().await?;
    app.run().await?;

    Ok(())
}

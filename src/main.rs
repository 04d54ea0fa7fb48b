use hub_mirror::cli::{Args, Runner};
use hub_mirror::logging::{self, Logger};

#[tokio::main]
async fn main() {
    let args = Args::parse_args().from_env();
    logging::init(args.verbose);
    let output = Logger::new();

    let result = match Runner::new(args) {
        Ok(runner) => runner.run().await.map(|_| ()),
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

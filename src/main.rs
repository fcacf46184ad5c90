//! Coupon Stack CLI
//!
//! Resolves a coupon stack for one product against a YAML coupon set and prints
//! the receipt.

use std::{
    io::{self, Write},
    process::ExitCode,
};

use anyhow::Context;
use jiff::Timestamp;
use tracing::{error, info};

use coupon_stack::{
    best_deal::best_single_coupon,
    cart::ProductId,
    config::CliConfig,
    fixtures::Fixture,
    observability,
    receipt::StackReceipt,
    stack::{StackRequest, StackResolver, StackResult},
};

fn main() -> ExitCode {
    let config = match CliConfig::load() {
        Ok(config) => config,
        Err(err) => {
            // Help and version requests are reported through the same path.
            _ = err.print();

            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(err) = observability::init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for subscriber errors"
        )]
        {
            eprintln!("Logging error: {err}");
        }

        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");

            ExitCode::FAILURE
        }
    }
}

fn run(config: &CliConfig) -> anyhow::Result<()> {
    let mut fixture = Fixture::with_base_path(config.fixtures.clone());

    fixture
        .load_coupons(&config.set)
        .with_context(|| format!("loading coupon set {:?}", config.set))?;

    let resolver =
        StackResolver::with_options(fixture.into_repository(), config.resolver_options());
    let product_id = ProductId::new(config.product.as_str());
    let now = config.at.unwrap_or_else(Timestamp::now);

    let result = if let Some(input) = config.codes.as_deref() {
        let request = StackRequest::from_input(input, product_id, config.subtotal)?;

        resolver.resolve(&request, now)?
    } else {
        let Some(deal) = best_single_coupon(&resolver, &product_id, config.subtotal, now)? else {
            info!(product = %product_id, "no coupon lowers the price");

            return Ok(());
        };

        StackResult::Applied(deal.outcome)
    };

    let mut stdout = io::stdout().lock();

    StackReceipt::new(&result).write_to(&mut stdout)?;
    stdout.flush()?;

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Re-run whenever an interface definition changes.
    println!("cargo:rerun-if-changed=proto");

    tonic_build::configure()
        // Clients are generated for the integration tests and for callers
        // embedding this crate.
        .build_client(true)
        .build_server(true)
        .compile(
            &[
                "proto/google/type/date.proto",
                "proto/google/type/money.proto",
                "proto/ledger/v1/ledger.proto",
            ],
            &["proto"],
        )?;

    Ok(())
}

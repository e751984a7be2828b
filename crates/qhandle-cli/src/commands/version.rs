//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - future result handles for remote job execution",
        style("qhandle").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qhandle-hal            Execution platform interface");
    println!("  qhandle-future         Future handles, submitter, handle files");
    println!("  qhandle-adapter-mock   In-memory platform");
    println!("  qhandle-adapter-rest   HTTP job service platform");
    println!("  qhandle-cli            Command-line interface");
    println!();
    println!(
        "Repository: {}",
        style("https://github.com/hiq-lab/qhandle").underlined()
    );
    println!("License:    {}", style("Apache-2.0").dim());
}

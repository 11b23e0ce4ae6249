use crate::output::UserOutput;
use std::io::Write;
use remote_starter::config::PanelConfig;
use remote_starter::registry::Registry;
use remote_starter::store::JsonStore;

pub fn run_list(config: &PanelConfig, json: bool, out: &dyn UserOutput) -> anyhow::Result<()> {
    let registry = Registry::load(
        JsonStore::new(config.registry_path()),
        config.launcher_policy(),
    );

    if json {
        return write_json(&registry, &mut std::io::stdout().lock());
    }

    out.status("Applications:");
    out.status(&format!("{:-<60}", ""));

    if registry.is_empty() {
        out.status("  No applications registered");
        return Ok(());
    }

    for (name, record) in registry.ordered() {
        let port = record
            .port
            .map(|port| format!(":{}", port))
            .unwrap_or_default();
        out.status(&format!(
            "  {:<24} {:<7} {}",
            name,
            port,
            record.path.display()
        ));
    }

    Ok(())
}

/// JSON goes to stdout even under `--quiet`, since scripts ask for it.
fn write_json(registry: &Registry, writer: &mut dyn Write) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &registry.list())?;
    writeln!(writer)?;
    Ok(())
}

use anyhow::Result;
use rebelle_dao::{Config, Directory, ENV_CONTEXT};

pub fn run(directory: &Directory, config: &Config, show_secrets: bool) -> Result<()> {
    let root = directory.initial_context();
    let env = root.lookup_context(ENV_CONTEXT)?;
    let names = env.list();

    println!("Bindings in {}:", ENV_CONTEXT);
    for line in describe(&names, config, show_secrets) {
        println!("  {}", line);
    }

    Ok(())
}

fn describe(names: &[String], config: &Config, show_secrets: bool) -> Vec<String> {
    names
        .iter()
        .map(|name| {
            let url = config
                .bindings
                .iter()
                .find(|b| &b.name == name)
                .map(|b| if show_secrets { b.url.clone() } else { b.redacted_url() })
                .unwrap_or_else(|| "-".to_string());
            format!("{:<24} {}", name, url)
        })
        .collect()
}

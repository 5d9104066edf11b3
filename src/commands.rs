use crate::cli::{ConnectionArgs, StoryArgs};
use crate::config::{Config, ConfigFile, Layer, TOKEN_ENV, TrackerConfig};
use crate::pipeline::StoryPipeline;
use crate::tracker::{StoryRequest, TrackerClient, resolve_story_type};
use crate::ui::output;
use anyhow::{Context, Result, bail};
use std::io::{self, BufRead, Write};
use std::path::Path;

pub async fn story(args: StoryArgs) -> Result<()> {
    if args.title.is_empty() {
        bail!("Provide story title");
    }

    let settings = ConfigFile::open()?
        .resolve(&args.connection.layer(), &Layer::from_env())
        .into_settings()?;
    let client = TrackerClient::new(&settings)?;
    let pipeline = StoryPipeline::new(&client);

    let placement = pipeline.resolve_placement(args.important).await;

    let resolution = resolve_story_type(args.bug, args.chore);
    if resolution.conflict {
        output::render_warning("Story type cannot be chore and bug, both will be ignored")?;
    }

    let request = StoryRequest::build(
        &args.title,
        resolution.story_type,
        &args.labels,
        args.estimate,
        placement,
    );

    let story = pipeline.submit(&request).await?;
    output::render_story_created(&story)?;

    Ok(())
}

/// Print the config file (if any) and where token, project and api_url come from
pub fn config_show(connection: &ConnectionArgs) -> Result<()> {
    let file = ConfigFile::open()?;

    if file.exists() {
        println!("# {}", file.path.display());
        println!();
        let raw = std::fs::read_to_string(&file.path)
            .with_context(|| format!("Failed to read config file: {}", file.path.display()))?;
        print!("{}", raw);
        println!();
    } else {
        println!(
            "# No config file at {} (run 'pivo config init' to create one)",
            file.path.display()
        );
        println!();
    }

    println!("# Resolved settings (flag > env > config file > default)");
    for line in file
        .resolve(&connection.layer(), &Layer::from_env())
        .report()
    {
        println!("#   {}", line);
    }
    Ok(())
}

pub fn config_init(project: Option<String>) -> Result<()> {
    let path = ConfigFile::default_path()?;
    let stdin = io::stdin();
    init_at(&path, project, &mut stdin.lock(), &mut io::stdout())
}

fn init_at(
    path: &Path,
    project: Option<String>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    if path.exists() {
        write!(out, "Config already exists at {}. Overwrite? [y/N] ", path.display())?;
        out.flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer)?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            writeln!(out, "Aborted.")?;
            return Ok(());
        }
    }

    let config = Config {
        tracker: TrackerConfig {
            project: project.filter(|p| !p.trim().is_empty()),
            ..Default::default()
        },
    };
    ConfigFile::write(path, &config)?;

    writeln!(out, "Config written to {}", path.display())?;
    if config.tracker.project.is_none() {
        writeln!(out, "Set the project with 'project = \"<id>\"' under [tracker].")?;
    }
    if std::env::var(TOKEN_ENV).is_err() {
        writeln!(
            out,
            "Keep the token out of the file if you can: export {}=\"your-api-token\"",
            TOKEN_ENV
        )?;
    }

    Ok(())
}

pub async fn config_verify(connection: &ConnectionArgs) -> Result<()> {
    let settings = ConfigFile::open()?
        .resolve(&connection.layer(), &Layer::from_env())
        .into_settings()?;

    println!("Checking Pivotal Tracker configuration...");
    println!("  api_url: {}", settings.api_url);
    println!("  project: {}", settings.project);

    let client = TrackerClient::new(&settings)?;
    let project = client
        .get_project()
        .await
        .context("Failed to access project")?;

    println!(
        "Verification successful: project #{} \"{}\" is reachable.",
        project.id, project.name
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn run_init(path: &Path, project: Option<&str>, answer: &str) -> String {
        let mut out = Vec::new();
        init_at(
            path,
            project.map(String::from),
            &mut answer.as_bytes(),
            &mut out,
        )
        .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_init_writes_project() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let out = run_init(&path, Some("4242"), "");
        assert!(out.contains("Config written to"));

        let file = ConfigFile::open_at(path).unwrap();
        assert_eq!(
            file.config.unwrap().tracker.project.as_deref(),
            Some("4242")
        );
    }

    #[test]
    fn test_init_declined_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tracker]\nproject = \"1\"\n").unwrap();

        let out = run_init(&path, Some("2"), "n\n");
        assert!(out.contains("Overwrite? [y/N]"));
        assert!(out.contains("Aborted."));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[tracker]\nproject = \"1\"\n"
        );
    }

    #[test]
    fn test_init_confirmed_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tracker]\nproject = \"1\"\n").unwrap();

        let out = run_init(&path, Some("2"), "Yes\n");
        assert!(!out.contains("Aborted."));

        let file = ConfigFile::open_at(path).unwrap();
        assert_eq!(file.config.unwrap().tracker.project.as_deref(), Some("2"));
    }
}

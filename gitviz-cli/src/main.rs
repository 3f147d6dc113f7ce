use std::io::Write;
use std::process;

use gitviz::render::{self, Dot, Renderer as _};
use gitviz::{dot, logger, GitStore, Graph};

mod args;

use args::Options;

fn main() {
    let options = match Options::from_env() {
        Ok(options) => options,
        Err(err) => match err.downcast_ref::<args::Error>() {
            Some(args::Error::Help) => {
                println!("{} {}\n{}", args::NAME, args::VERSION, args::USAGE);
                process::exit(0);
            }
            Some(args::Error::Version) => {
                println!("{} {} ({})", args::NAME, args::VERSION, args::GIT_HEAD);
                process::exit(0);
            }
            None => {
                eprintln!("{}: {err}", args::NAME);
                eprintln!("Try `{} --help` for more information.", args::NAME);
                process::exit(1);
            }
        },
    };
    logger::init(options.verbosity.level(logger::env_level())).ok();

    if let Err(err) = run(options) {
        eprintln!("{}: fatal: {err:#}", args::NAME);
        process::exit(1);
    }
}

fn run(options: Options) -> anyhow::Result<()> {
    // Checked before anything is read from the store.
    let store = GitStore::open(&options.path)?;
    let mut graph = Graph::new();

    logger::benchmark("Loose object discovery", || graph.discover_loose(&store))?;
    logger::benchmark("Packed object discovery", || graph.discover_packed(&store))?;

    let skipped = graph.errors().len();
    if skipped > 0 {
        log::warn!(target: "gitviz", "Skipped {skipped} object(s)");
    }
    let document = dot::document(&graph);

    if options.stdout {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(document.as_bytes())?;
        stdout.flush()?;

        return Ok(());
    }
    let renderer = Dot::new(render::Options::new(options.output()).with_format(options.format));

    if options.render {
        let rendered = match render::run(&renderer, &document) {
            Ok(rendered) => rendered,
            Err(err) => {
                if let Some(document) = err.document() {
                    log::error!(
                        target: "gitviz",
                        "The document was kept at {}",
                        document.display()
                    );
                }
                return Err(err.into());
            }
        };
        println!(
            "{} object(s), {skipped} skipped: {}",
            graph.len(),
            rendered.artifact.display()
        );
    } else {
        let path = renderer.write_document(&document)?;
        println!("{} object(s), {skipped} skipped: {}", graph.len(), path.display());
    }
    Ok(())
}

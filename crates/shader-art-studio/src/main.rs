use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use shader_art_engine::gfx::{Gpu, GpuInit, GpuUniforms, GraphicsContext, UniformBlock, UniformKind};
use shader_art_engine::host::ShaderArt;
use shader_art_engine::logging::{LoggingConfig, init_logging};
use shader_art_uniforms::{Axis, DebugPanel, DebugPanelFactory, UniformBinder};

const DEMO: &str = include_str!("../art/demo.html");

const USAGE: &str = "usage: shader-art-studio [--gpu] [-v] [markup.html] [name=value | name.x=value | name=#rrggbb]...";

fn main() -> Result<()> {
    let options = Options::parse(std::env::args().skip(1))?;
    let level = if options.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    init_logging(LoggingConfig::with_level(level));

    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║        SHADER-ART STUDIO  v0.1         ║");
    println!("  ║   uniform binder  ·  debug panel       ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();

    let markup = match &options.markup {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => DEMO.to_string(),
    };

    let panels = DebugPanelFactory::new();
    let plugin_panels = panels.clone();
    let mut art = ShaderArt::from_markup(&markup)?
        .plugin(move || UniformBinder::new(plugin_panels.clone()));

    let mut target = None;
    art.connect(|program| {
        let t = if options.gpu {
            let gpu = pollster::block_on(Gpu::new(GpuInit::default()))?;
            let uniforms = Rc::new(GpuUniforms::new(gpu.device(), program));
            Target::Gpu { gpu, uniforms }
        } else {
            Target::Cpu(Rc::new(UniformBlock::new(program)))
        };
        let gl = t.context();
        target = Some(t);
        Ok(gl)
    })?;
    let target = target.context("graphics context was not created")?;
    let panel = panels.last().context("uniform binder created no panel")?;

    if let Some(canvas) = art.canvas() {
        println!("  canvas      {}x{}", canvas.width, canvas.height);
    }
    print_controls("initial", &panel);
    print_block("initial", target.block());
    target.flush();

    if !options.edits.is_empty() {
        for edit in &options.edits {
            if !edit.apply(&panel) {
                log::warn!("no control accepts '{}'", edit.source);
            }
        }
        print_controls("edited", &panel);
        print_block("edited", target.block());
        target.flush();
    }

    art.disconnect();
    Ok(())
}

// ── Command line ──────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq)]
struct Options {
    gpu: bool,
    verbose: bool,
    markup: Option<PathBuf>,
    edits: Vec<Edit>,
}

impl Options {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self::default();
        for arg in args {
            match arg.as_str() {
                "--gpu" => options.gpu = true,
                "-v" | "--verbose" => options.verbose = true,
                "-h" | "--help" => {
                    println!("{USAGE}");
                    std::process::exit(0);
                }
                flag if flag.starts_with("--") => bail!("unknown flag {flag}\n{USAGE}"),
                _ if arg.contains('=') => options.edits.push(Edit::parse(&arg)?),
                _ if options.markup.is_none() => options.markup = Some(PathBuf::from(arg)),
                _ => bail!("unexpected argument {arg:?}\n{USAGE}"),
            }
        }
        Ok(options)
    }
}

/// One simulated panel edit from the command line.
#[derive(Debug, PartialEq)]
struct Edit {
    source: String,
    key: String,
    axis: Option<Axis>,
    value: EditValue,
}

#[derive(Debug, PartialEq)]
enum EditValue {
    Number(f64),
    Color(String),
}

impl Edit {
    fn parse(arg: &str) -> Result<Self> {
        let Some((target, value)) = arg.split_once('=') else {
            bail!("edit {arg:?} is not name=value");
        };
        let (key, axis) = match target.rsplit_once('.') {
            Some((key, axis)) => {
                let axis = Axis::ALL
                    .into_iter()
                    .find(|a| a.as_str() == axis)
                    .with_context(|| format!("edit {arg:?}: unknown axis {axis:?}"))?;
                (key, Some(axis))
            }
            None => (target, None),
        };
        anyhow::ensure!(!key.is_empty(), "edit {arg:?} has no uniform name");
        let value = if value.starts_with('#') {
            EditValue::Color(value.to_string())
        } else {
            EditValue::Number(value.parse().with_context(|| format!("edit {arg:?}: not a number"))?)
        };
        Ok(Self { source: arg.to_string(), key: key.to_string(), axis, value })
    }

    fn apply(&self, panel: &DebugPanel) -> bool {
        match &self.value {
            EditValue::Number(v) => panel.set_number(&self.key, self.axis, *v),
            EditValue::Color(hex) => self.axis.is_none() && panel.set_color(&self.key, hex),
        }
    }
}

// ── Graphics target ───────────────────────────────────────────────────────

enum Target {
    Cpu(Rc<UniformBlock>),
    Gpu { gpu: Gpu, uniforms: Rc<GpuUniforms> },
}

impl Target {
    fn context(&self) -> Rc<dyn GraphicsContext> {
        match self {
            Self::Cpu(block) => block.clone(),
            Self::Gpu { uniforms, .. } => uniforms.clone(),
        }
    }

    fn block(&self) -> &UniformBlock {
        match self {
            Self::Cpu(block) => block,
            Self::Gpu { uniforms, .. } => uniforms.block(),
        }
    }

    fn flush(&self) {
        if let Self::Gpu { gpu, uniforms } = self {
            if uniforms.flush(gpu.queue()) {
                log::info!("uniform buffer updated on '{}'", gpu.adapter_info().name);
            }
        }
    }
}

// ── Output ────────────────────────────────────────────────────────────────

fn print_controls(title: &str, panel: &DebugPanel) {
    println!("  {title} controls");
    for control in panel.controls() {
        let label = match &control.folder {
            Some(folder) => format!("{folder}.{}", control.label),
            None => control.label.clone(),
        };
        println!("    {label:<16} {:<10} {:?} listeners={}", control.value, control.kind, control.listeners);
    }
    println!();
}

fn print_block(title: &str, block: &UniformBlock) {
    println!("  {title} uniforms");
    for info in block.program().uniforms() {
        let value = match info.kind {
            UniformKind::Int | UniformKind::Bool => block.read_i32(&info.name).map(|v| v.to_string()),
            _ => block.read_f32s(&info.name).map(|v| format!("{v:?}")),
        };
        println!("    {:<16} {:<6} {}", info.name, info.kind.to_string(), value.unwrap_or_else(|| "-".into()));
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_path_and_edits() {
        let o = Options::parse(args(&["--gpu", "-v", "art.html", "speed=2", "center.y=0.25", "tint=#ff0000"])).unwrap();
        assert!(o.gpu);
        assert!(o.verbose);
        assert_eq!(o.markup, Some(PathBuf::from("art.html")));
        assert_eq!(o.edits.len(), 3);
        assert_eq!(o.edits[1].key, "center");
        assert_eq!(o.edits[1].axis, Some(Axis::Y));
        assert_eq!(o.edits[2].value, EditValue::Color("#ff0000".into()));
    }

    #[test]
    fn rejects_bad_edits() {
        assert!(Edit::parse("speed=fast").is_err());
        assert!(Edit::parse("center.q=1").is_err());
        assert!(Edit::parse("=1").is_err());
        assert!(Options::parse(args(&["a.html", "b.html"])).is_err());
        assert!(Options::parse(args(&["--verbose"])).is_err());
    }

    #[test]
    fn demo_binds_and_applies_edits() {
        let panels = DebugPanelFactory::new();
        let plugin_panels = panels.clone();
        let mut art = ShaderArt::from_markup(DEMO)
            .unwrap()
            .plugin(move || UniformBinder::new(plugin_panels.clone()));
        let mut block = None;
        art.connect(|program| {
            let b = Rc::new(UniformBlock::new(program));
            block = Some(b.clone());
            Ok(b as Rc<dyn GraphicsContext>)
        })
        .unwrap();
        let block = block.unwrap();
        let panel = panels.last().unwrap();

        assert_eq!(block.read_f32s("speed"), Some(vec![1.5]));
        assert_eq!(block.read_i32("rings"), Some(12));
        assert!(panel.find("time", None).is_none());

        for edit in ["speed=20", "rings=3", "center.x=0.25", "tint=#ffffff"] {
            assert!(Edit::parse(edit).unwrap().apply(&panel), "{edit}");
        }
        assert_eq!(block.read_f32s("speed"), Some(vec![10.0]));
        assert_eq!(block.read_i32("rings"), Some(3));
        assert_eq!(block.read_f32s("center"), Some(vec![0.25, 0.5]));
        assert_eq!(block.read_f32s("tint"), Some(vec![1.0, 1.0, 1.0]));
        let speed = panel.controls().into_iter().find(|c| c.key == "speed").unwrap();
        assert_eq!(speed.value, "10");
        assert!(!Edit::parse("tint.x=1").unwrap().apply(&panel));
    }
}

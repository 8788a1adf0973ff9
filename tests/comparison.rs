use benchplot::charts::{Comparison, ComparisonError, ImageFormat, StaticChartRenderer};
use benchplot::config::Config;
use benchplot::data::{CleaningPolicy, LoaderError, SeriesLoader};
use plotters::style::{FontDesc, FontFamily, FontStyle};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const NO_CULLING: &str = "frameNumber,gpuTime,meshes,first,second\n\
1,20.0,2000,2000,0\n1,22.0,2010,2010,0\n2,21.0,0,0,0\n3,19.0,1990,1990,0\n4,20.5,2005,2005,0\n";
const FRUSTUM_ONLY: &str = "frameNumber,gpuTime,meshes,first,second\n\
1,12.0,800,800,0\n2,11.0,790,790,0\n3,0,0,0,0\n3,13.0,810,810,0\n4,12.5,805,805,0\n";
const TWO_PASS: &str = "frameNumber,gpuTime,meshes,first,second\n\
1,8.0,300,250,50\n2,7.5,310,260,50\n3,8.5,290,240,50\n4,8.0,305,255,50\n";

fn benchmarks() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in [
        ("data_noCulling.csv", NO_CULLING),
        ("data_frustumOnly.csv", FRUSTUM_ONLY),
        ("data_twoPass.csv", TWO_PASS),
    ] {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

#[test]
fn meshes_preset_compares_three_strategies() {
    let dir = benchmarks();
    let config = Config::builtin().unwrap();
    let spec = config.chart("meshes").unwrap();
    let loader = SeriesLoader::new(dir.path());

    let comparison = Comparison::build(spec, &config.palette, &loader, spec.cleaning).unwrap();

    let labels: Vec<&str> = comparison.series.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, ["No Culling", "Frustum Only", "Two-Pass"]);

    // frame 2 of the no-culling run is a sentinel zero
    assert_eq!(comparison.series[0].series.frame_numbers(), vec![1, 3, 4]);
    assert!((comparison.series[0].stats.mean - (2005.0 + 1990.0 + 2005.0) / 3.0).abs() < 1e-9);

    assert!(comparison.series[0].stats.p_value.is_none());
    assert!(comparison.series[2].stats.is_significant);
    assert_eq!(comparison.legend_label(2), "Two-Pass (301)");
    assert_eq!(comparison.frame_range(), (1, 4));
}

#[test]
fn passes_preset_reads_two_columns_of_one_file() {
    let dir = benchmarks();
    let config = Config::builtin().unwrap();
    let spec = config.chart("passes").unwrap();
    let loader = SeriesLoader::new(dir.path());

    let comparison =
        Comparison::build(spec, &config.palette, &loader, CleaningPolicy::None).unwrap();

    assert_eq!(comparison.series[0].series.column(), "first");
    assert_eq!(comparison.series[1].series.column(), "second");
    assert_eq!(comparison.series[1].stats.mean, 50.0);
    assert_eq!(comparison.series[1].stats.std, 0.0);
}

#[test]
fn missing_benchmark_names_the_file() {
    let dir = benchmarks();
    let config = Config::builtin().unwrap();
    let spec = config.chart("meshes-regression").unwrap();
    let loader = SeriesLoader::new(dir.path());

    let err = Comparison::build(spec, &config.palette, &loader, spec.cleaning).unwrap_err();

    assert!(matches!(
        err,
        ComparisonError::Loader(LoaderError::InputNotFound { .. })
    ));
    assert!(err.to_string().contains("test0.csv") || err.to_string().contains("test1.csv"));
}

/// Plotters lays text out with system fonts; without any, rendering fails.
fn fonts_available() -> bool {
    let available = FontDesc::new(FontFamily::SansSerif, 12.0, FontStyle::Normal)
        .box_size("Frame Number")
        .is_ok();
    if !available {
        eprintln!("no system fonts, skipping chart rendering");
    }
    available
}

fn render_gputime(format: ImageFormat) -> (TempDir, Vec<PathBuf>) {
    let dir = benchmarks();
    let out = tempfile::tempdir().unwrap();
    let config = Config::builtin().unwrap();
    let loader = SeriesLoader::new(dir.path());

    let gputime = config.chart("gputime").unwrap();
    let comparison = Comparison::build(gputime, &config.palette, &loader, gputime.cleaning).unwrap();
    let written = StaticChartRenderer::render_comparison(&comparison, out.path(), format).unwrap();

    assert_eq!(
        written,
        vec![
            StaticChartRenderer::line_path(out.path(), "gputime", format),
            StaticChartRenderer::bar_path(out.path(), "gputime", format),
        ]
    );
    (out, written)
}

#[test]
fn writes_png_line_and_bar_charts() {
    if !fonts_available() {
        return;
    }
    let (_out, written) = render_gputime(ImageFormat::Png);

    for path in &written {
        let bytes = fs::read(path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"), "{} is not a PNG", path.display());
    }
}

#[test]
fn writes_svg_line_and_bar_charts() {
    if !fonts_available() {
        return;
    }
    let (_out, written) = render_gputime(ImageFormat::Svg);

    let line = fs::read_to_string(&written[0]).unwrap();
    assert!(line.contains("GPU Time per Frame"));
    let bar = fs::read_to_string(&written[1]).unwrap();
    assert!(bar.contains("Mean GPU Time"));
}

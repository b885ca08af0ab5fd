use console::Style;
use fpana_core::config::{FilePlan, JobConfig};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_job_summary(stage: &str, config: &JobConfig) {
    let s = Styles::new();
    let title = format!("fpana {stage}");

    println!();
    println!("  {}", s.title.apply_to(&title));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(title.chars().count())));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.base_dir.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.out_dir.display())
    );
    println!();

    // File plan
    println!("  {}", s.header.apply_to("File Plan"));
    match &config.plan {
        FilePlan::RunFieldRange {
            ranges,
            camcol,
            filter,
        } => {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Shape"),
                s.method.apply_to("run/field ranges")
            );
            println!(
                "    {:<12}{}",
                s.label.apply_to("Camcol"),
                s.value.apply_to(camcol)
            );
            println!(
                "    {:<12}{}",
                s.label.apply_to("Filter"),
                s.value.apply_to(filter)
            );
            for r in ranges {
                println!(
                    "    {:<12}{}",
                    s.label.apply_to("Run"),
                    s.value.apply_to(format!("{} fields {}..={}", r.run, r.field_min, r.field_max))
                );
            }
        }
        FilePlan::RunFieldCamCol { entries, filters } => {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Shape"),
                s.method.apply_to("run/field/camcol list")
            );
            println!(
                "    {:<12}{}",
                s.label.apply_to("Entries"),
                s.value.apply_to(entries.len())
            );
            let symbols: String = filters.iter().map(|f| f.symbol()).collect();
            println!(
                "    {:<12}{}",
                s.label.apply_to("Filters"),
                s.value.apply_to(symbols)
            );
        }
    }
    println!();

    // Aggregation
    println!("  {}", s.header.apply_to("Aggregation"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Sky"),
        s.value.apply_to(format!(
            "ra [{}, {}) dec [{}, {})",
            config.sky.ra_min, config.sky.ra_max, config.sky.dec_min, config.sky.dec_max
        ))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Cells"),
        s.value.apply_to(format!("{} x {}", config.sky.nb_ra, config.sky.nb_dec))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Flux"),
        s.value.apply_to(format!("[{}, {}]", config.flux.min, config.flux.max))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Variance"),
        s.method.apply_to(config.variance_policy)
    );
    println!();
}

use dermascribe::rules::glossary::concern_title;
use dermascribe::rules::{IngredientProfile, Interaction};
use dermascribe::{Analysis, AnalysisDetails, Finding, MAX_RATING};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_analysis(analysis: &Analysis, details: Option<&AnalysisDetails>, color: bool) {
    let palette = ansi::Palette::new(color);
    let empty = MAX_RATING.saturating_sub(analysis.rating) as usize;
    let stars = format!("{}{}", "★".repeat(analysis.rating as usize), "☆".repeat(empty));
    let rating_color = match analysis.rating {
        5 => ansi::GREEN,
        4 => ansi::YELLOW,
        _ => ansi::RED,
    };

    println!(
        "\n{}  {}",
        palette.bold(palette.paint(format!("Rating {}/5", analysis.rating), rating_color)),
        palette.paint(stars, rating_color)
    );
    println!("  {}", analysis.summary);

    println!("\n{}", palette.paint("━━━ Actives ━━━", ansi::GRAY));
    if analysis.active_ingredients.is_empty() {
        println!("{}", palette.dim("  No known actives found"));
    } else {
        println!("  {}", palette.paint(analysis.active_ingredients.join(", "), ansi::CYAN));
    }

    println!("\n{}", palette.paint("━━━ Interactions ━━━", ansi::GRAY));
    if analysis.findings.is_empty() {
        println!("{}", palette.dim("  No conflicts or synergies"));
    }
    for finding in &analysis.findings {
        print_finding(finding, &palette);
    }

    println!("\n{}", palette.paint("━━━ Essentials ━━━", ansi::GRAY));
    let gap_color = if analysis.is_complete() { ansi::GREEN } else { ansi::YELLOW };
    println!("  {}", palette.paint(&analysis.gap_analysis, gap_color));

    println!("\n{}", palette.paint("━━━ Routine ━━━", ansi::GRAY));
    println!("  {} {}", palette.bold(palette.paint("AM", ansi::YELLOW)), analysis.am_routine);
    println!("  {} {}", palette.bold(palette.paint("PM", ansi::BLUE)), analysis.pm_routine);

    if let Some(details) = details {
        print_details(details, &palette);
    }
    println!();
}

fn print_finding(finding: &Finding, palette: &ansi::Palette) {
    let (marker, color) = match finding.kind {
        Interaction::Conflict => ("✗", ansi::RED),
        Interaction::Synergy => ("✓", ansi::GREEN),
    };
    println!("  {} {}", palette.paint(marker, color), finding);
}

fn print_details(details: &AnalysisDetails, palette: &ansi::Palette) {
    println!("\n{}", palette.paint("━━━ Resolution ━━━", ansi::GRAY));
    for (idx, product) in details.products.iter().enumerate() {
        let actives = if product.actives.is_empty() {
            palette.dim("(none)")
        } else {
            palette.paint(product.actives.join(", "), ansi::CYAN)
        };
        let index = palette.paint(format!("[{idx}]"), ansi::GRAY);
        println!("  {} {} {} {}", index, product.product, palette.dim("│"), actives);
    }

    let timings = &details.timings;
    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Resolve: {}  │  Interactions: {}  │  Completeness: {}  │  Schedule: {}",
        palette.paint(format!("{:?}", timings.total), ansi::GREEN),
        palette.dim(format!("{:?}", timings.resolve)),
        palette.dim(format!("{:?}", timings.interactions)),
        palette.dim(format!("{:?}", timings.completeness)),
        palette.dim(format!("{:?}", timings.schedule)),
    );
}

pub fn print_glossary(entries: &[&IngredientProfile], color: bool) {
    let palette = ansi::Palette::new(color);
    if entries.is_empty() {
        println!("{}", palette.dim("No matching ingredients"));
        return;
    }

    for profile in entries {
        println!(
            "\n{} {}",
            palette.bold(palette.paint(&profile.display_name, ansi::CYAN)),
            palette.dim(format!("({})", profile.kind.as_deref().unwrap_or("active")))
        );
        if let Some(description) = &profile.description {
            println!("  {description}");
        }
        if let Some(best_time) = &profile.best_time {
            println!("  {} {}", palette.dim("Best time:"), best_time);
        }
        if !profile.concerns_targeted.is_empty() {
            let concerns: Vec<String> = profile.concerns_targeted.iter().map(|c| concern_title(c)).collect();
            println!("  {} {}", palette.dim("Targets:"), concerns.join(", "));
        }
        if let Some(warning) = &profile.warning {
            println!("  {} {}", palette.paint("Warning:", ansi::YELLOW), warning);
        }
    }
    println!();
}

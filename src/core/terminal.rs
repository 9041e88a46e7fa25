use console::{Emoji, style};

pub static SUCCESS_ICON: Emoji<'_, '_> = Emoji("✅ ", "");
pub static INFO_ICON: Emoji<'_, '_> = Emoji("ℹ️  ", "");
pub static WARN_ICON: Emoji<'_, '_> = Emoji("⚠️  ", "");
pub static ERROR_ICON: Emoji<'_, '_> = Emoji("❌ ", "");
pub static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");
pub static ARROW: Emoji<'_, '_> = Emoji("➜ ", "> ");
pub static BULLET: Emoji<'_, '_> = Emoji("• ", "- ");

pub fn print_success(msg: &str) {
    println!("{} {}", SUCCESS_ICON, style(msg).green());
}

pub fn print_info(msg: &str) {
    println!("{} {}", INFO_ICON, style(msg).blue());
}

pub fn print_warn(msg: &str) {
    println!("{} {}", WARN_ICON, style(msg).yellow());
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", ERROR_ICON, style(msg).red().bold());
}

pub fn print_banner() {
    println!();
    println!(
        "  {} {}",
        style(" FF ").bold().white().on_blue(),
        style("Flash Fix").bold()
    );
    println!("  {}", style("Turnover bookings, job logs, webhooks.").dim());
    println!();
}

/// A titled block of terminal output, built line by line.
pub struct GuideSection {
    title: String,
    lines: Vec<String>,
}

impl GuideSection {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            lines: Vec::new(),
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        self.lines.push(format!("  {}", text));
        self
    }

    pub fn bullet(mut self, text: &str) -> Self {
        self.lines.push(format!("  {}{}", BULLET, text));
        self
    }

    pub fn status(mut self, label: &str, value: &str) -> Self {
        self.lines
            .push(format!("  {} {}: {}", GEAR, style(label).bold().cyan(), value));
        self
    }

    pub fn command(mut self, name: &str, description: &str) -> Self {
        self.lines.push(format!(
            "  {:<22} {}",
            style(name).green().bold(),
            style(description).dim()
        ));
        self
    }

    /// A runnable example, with an optional trailing note.
    pub fn hint(mut self, example: &str, note: &str) -> Self {
        let mut line = format!("  {}{}", ARROW, style(example).cyan());
        if !note.is_empty() {
            line.push_str(&format!("  {}", style(note).dim()));
        }
        self.lines.push(line);
        self
    }

    pub fn info(mut self, text: &str) -> Self {
        self.lines.push(format!("  {} {}", INFO_ICON, text));
        self
    }

    pub fn blank(mut self) -> Self {
        self.lines.push(String::new());
        self
    }

    pub fn print(&self) {
        println!();
        println!(" {}", style(&self.title).bold().underlined());
        for line in &self.lines {
            println!("{}", line);
        }
    }
}

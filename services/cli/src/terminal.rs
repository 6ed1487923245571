//! Terminal front end: banner, menus, per-iteration panels and the final
//! scorecard. Spinners draw on stderr next to the logs; everything else goes
//! to stdout.

use console::{Color, Style, Term, measure_text_width, style};
use dialoguer::{Select, theme::ColorfulTheme};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;
use tracing::warn;
use viral_core::persona::Persona;
use viral_core::platform::{Platform, Rubric, RubricTable};
use viral_core::round::{Decision, LockedRound, Round, RoundError, RoundObserver, Stage};
use viral_core::score::{Headline, Rating, ScoreReport};

const MIN_PANEL_WIDTH: usize = 40;
const MAX_PANEL_WIDTH: usize = 100;

/// A menu that could not produce a choice.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// The player pressed Ctrl+C while the menu was open.
    #[error("Prompt interrupted")]
    Interrupted,
    #[error(transparent)]
    Terminal(dialoguer::Error),
}

impl From<dialoguer::Error> for PromptError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted => {
                PromptError::Interrupted
            }
            other => PromptError::Terminal(other),
        }
    }
}

/// Maps a failed decision prompt to a decision. Ctrl+C quits, anything else
/// locks the round in.
pub fn decision_on_error(err: dialoguer::Error) -> Decision {
    match PromptError::from(err) {
        PromptError::Interrupted => Decision::Quit,
        PromptError::Terminal(e) => {
            warn!(error = %e, "Decision prompt failed, locking in");
            Decision::LockIn
        }
    }
}

/// Draws a rounded box of exactly `width` columns around `body`, wrapping it
/// at word boundaries.
pub fn render_panel(title: &str, body: &str, width: usize) -> Vec<String> {
    let width = width.max(MIN_PANEL_WIDTH);
    let inner = width - 4;

    let title = if title.is_empty() {
        String::new()
    } else {
        format!(" {title} ")
    };
    let fill = width.saturating_sub(3 + measure_text_width(&title));

    let mut lines = vec![format!("╭─{title}{}╮", "─".repeat(fill))];
    for line in wrap(body, inner) {
        let pad = inner.saturating_sub(measure_text_width(&line));
        lines.push(format!("│ {line}{} │", " ".repeat(pad)));
    }
    lines.push(format!("╰{}╯", "─".repeat(width - 2)));
    lines
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for raw in text.lines() {
        let mut line = String::new();
        for word in raw.split_whitespace() {
            for chunk in split_long_word(word, width) {
                let needed = measure_text_width(&line) + 1 + measure_text_width(&chunk);
                if !line.is_empty() && needed > width {
                    out.push(std::mem::take(&mut line));
                }
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(&chunk);
            }
        }
        out.push(line);
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

fn split_long_word(word: &str, width: usize) -> Vec<String> {
    if measure_text_width(word) <= width {
        return vec![word.to_string()];
    }
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut buf = [0u8; 4];
    for ch in word.chars() {
        let ch_width = measure_text_width(ch.encode_utf8(&mut buf));
        if !current.is_empty() && measure_text_width(&current) + ch_width > width {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// One "label  score/100  rating" row of a score table.
pub fn metric_row(label: &str, score: f64) -> String {
    format!(
        "{label:<18}{:>7}  {}",
        format!("{score:.0}/100"),
        Rating::from_score(score).label()
    )
}

fn criterion_line(round: &Round, criterion: &str, score: f64) -> String {
    let weight = round
        .rubric()
        .criterion(criterion)
        .map(|c| c.weight)
        .unwrap_or_default();
    format!(
        "{:<24}{:>4}%  {:>3.0}/100  {}",
        criterion,
        weight,
        score,
        Rating::from_score(score).label()
    )
}

fn rating_style(rating: Rating) -> Style {
    match rating {
        Rating::Viral => Style::new().green().bold(),
        Rating::Strong => Style::new().green(),
        Rating::Decent => Style::new().yellow(),
        Rating::Weak => Style::new().red(),
        Rating::Fail => Style::new().red().bold(),
    }
}

fn headline_style(headline: Headline) -> Style {
    match headline {
        Headline::GoingViral => Style::new().green().bold(),
        Headline::Solid => Style::new().yellow(),
        Headline::Mid => Style::new().red(),
        Headline::Fail => Style::new().red().bold(),
    }
}

/// Interactive terminal session. Implements [`RoundObserver`] so the game loop
/// can report progress and ask for decisions.
pub struct TerminalUi {
    term: Term,
    theme: ColorfulTheme,
    spinner: Option<ProgressBar>,
}

impl Default for TerminalUi {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalUi {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            theme: ColorfulTheme::default(),
            spinner: None,
        }
    }

    /// Whether menus can be shown. Without a terminal every menu takes its
    /// default.
    pub fn is_interactive(&self) -> bool {
        self.term.is_term()
    }

    fn width(&self) -> usize {
        let (_, cols) = self.term.size();
        usize::from(cols).clamp(MIN_PANEL_WIDTH, MAX_PANEL_WIDTH)
    }

    fn print_panel(&self, title: &str, body: &str, color: Color) {
        let border = Style::new().fg(color);
        let lines = render_panel(title, body, self.width());
        let last = lines.len() - 1;
        for (i, line) in lines.iter().enumerate() {
            if i == 0 || i == last {
                println!("{}", border.apply_to(line));
            } else {
                let content = line
                    .strip_prefix('│')
                    .and_then(|l| l.strip_suffix('│'))
                    .unwrap_or(line);
                println!("{}{}{}", border.apply_to("│"), content, border.apply_to("│"));
            }
        }
    }

    pub fn banner(&self) {
        let body = "The Gaming Content Algorithm Game\n\n\
                    Can your content crack the algorithm?\n\
                    3 AI agents will judge your gaming post.";
        println!();
        self.print_panel("VIRAL OR FAIL", body, Color::Magenta);
    }

    pub fn agents_ready(&self, persona: &Persona) {
        println!("{}", style("Setting up AI agents...").bold());
        println!("  {} ready", style("Content Creator").green());
        println!("  {} ready", style("Algorithm Simulator").blue());
        println!(
            "  {} {}",
            style("Audience Persona").magenta(),
            style(persona).bold()
        );
        println!();
    }

    /// Lists `trends` and returns the player's pick, or the first one when no
    /// terminal is attached or the prompt is dismissed.
    pub fn select_trend(&self, trends: &[String]) -> Result<String, PromptError> {
        let index = if self.is_interactive() {
            Select::with_theme(&self.theme)
                .with_prompt("Pick a trending gaming topic")
                .items(trends)
                .default(0)
                .interact_on_opt(&self.term)?
                .unwrap_or(0)
        } else {
            0
        };
        Ok(trends.get(index).cloned().unwrap_or_default())
    }

    pub fn select_platform(
        &self,
        rubrics: &RubricTable,
    ) -> Result<Option<Platform>, PromptError> {
        let options: Vec<&Rubric> = rubrics.iter().collect();
        let labels: Vec<String> = options
            .iter()
            .map(|r| format!("{} - {}", r.platform, r.description))
            .collect();
        let index = if self.is_interactive() {
            Select::with_theme(&self.theme)
                .with_prompt("Choose your platform")
                .items(&labels)
                .default(0)
                .interact_on_opt(&self.term)?
                .unwrap_or(0)
        } else {
            0
        };
        Ok(options.get(index).map(|r| r.platform))
    }

    pub fn announce_choice(&self, topic: &str, platform: Platform, format_hint: &str) {
        println!(
            "\n{} {} on {}\n",
            style("You chose:").bold(),
            style(topic).cyan(),
            style(platform).cyan()
        );
        println!("{}", style(format!("Format hint: {format_hint}")).dim());
    }

    pub fn round_aborted(&mut self, err: &RoundError) {
        self.stop_spinner();
        println!();
        println!("{} {}", style("Round aborted:").red().bold(), err);
        println!(
            "{}",
            style("Check your token, model and network, then try again.").dim()
        );
    }

    pub fn farewell(&self) {
        println!(
            "\n{}\n",
            style(
                "Thanks for playing Viral or Fail! Try different platforms and see if you can beat your score."
            )
            .dim()
        );
    }

    pub fn interrupted(&mut self) {
        self.stop_spinner();
        println!("\n\n{}", style("Game interrupted. See you next time!").dim());
    }

    fn start_spinner(&mut self, message: String) {
        self.stop_spinner();
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn print_quick_score(&self, round: &Round, report: &ScoreReport) {
        println!();
        println!(
            "{}",
            style(format!("Attempt {} Quick Score", round.attempt())).bold()
        );
        for (label, score) in [
            ("Reach", report.signals.reach),
            ("Engagement", report.signals.engagement),
            ("Virality", report.signals.virality),
        ] {
            println!("  {}", metric_row(label, score));
        }
        let total = format!(
            "{:<18}{:>7}  {} (needs {:.0})",
            "Weighted Total",
            format!("{:.1}/100", report.weighted_sum),
            report.verdict,
            report.pass_threshold
        );
        let total_style = if report.verdict.is_viral() {
            Style::new().green().bold()
        } else {
            Style::new().red().bold()
        };
        println!("  {}", total_style.apply_to(total));
    }

    fn print_scorecard(&self, locked: &LockedRound) {
        let report = locked.score();
        println!();
        println!("{}", style("FINAL SCORECARD").yellow().bold());
        println!(
            "  {}",
            style(format!("{:<18}{:>7}  {}", "Metric", "Score", "Rating"))
                .cyan()
                .bold()
        );
        for (label, score) in [
            ("Reach", report.signals.reach),
            ("Engagement", report.signals.engagement),
            ("Virality", report.signals.virality),
            ("Weighted Total", report.weighted_sum),
        ] {
            let row = metric_row(label, score);
            println!(
                "  {}",
                rating_style(Rating::from_score(score)).apply_to(row)
            );
        }

        println!();
        for (key, value) in [
            ("Topic", locked.topic().to_string()),
            ("Platform", locked.platform().to_string()),
            ("Audience Persona", locked.persona().to_string()),
            (
                "Regenerations Used",
                format!("{}/{}", locked.iteration_count(), locked.max_iterations()),
            ),
            (
                "Verdict",
                format!(
                    "{} ({:.1} vs threshold {:.0})",
                    report.verdict, report.weighted_sum, report.pass_threshold
                ),
            ),
        ] {
            println!("  {:<20}{}", style(key).dim(), value);
        }

        let headline = Headline::from_total(report.weighted_sum);
        println!();
        println!("{}", style("VERDICT").bold());
        println!("  {}", headline_style(headline).apply_to(headline.message()));
    }
}

impl RoundObserver for TerminalUi {
    fn on_stage(&mut self, stage: Stage, round: &Round) {
        let message = match stage {
            Stage::Creating => {
                self.stop_spinner();
                let rule = "=".repeat(60);
                println!("\n{}", style(&rule).bold());
                println!(
                    "{}",
                    style(format!(
                        "  ATTEMPT {}/{}",
                        round.attempt(),
                        round.max_attempts()
                    ))
                    .yellow()
                    .bold()
                );
                println!("{}\n", style(&rule).bold());
                "Content Creator is cooking...".to_string()
            }
            Stage::Scoring => "Algorithm Simulator is processing...".to_string(),
            Stage::Reacting => format!("{} is reacting...", round.persona().handle),
        };
        self.start_spinner(message);
    }

    fn on_scored(&mut self, round: &Round) {
        self.stop_spinner();
        let Some(iteration) = round.latest() else {
            return;
        };
        let report = &iteration.score;

        println!();
        self.print_panel("Content Creator", &iteration.candidate_post, Color::Green);

        let mut analysis: Vec<String> = report
            .breakdown
            .iter()
            .map(|c| criterion_line(round, &c.criterion, c.score))
            .collect();
        if !report.analysis.is_empty() {
            analysis.push(String::new());
            analysis.push(report.analysis.clone());
        }
        if !report.recommendation.is_empty() {
            analysis.push(String::new());
            analysis.push(format!("Recommendation: {}", report.recommendation));
        }
        println!();
        self.print_panel("Algorithm Simulator", &analysis.join("\n"), Color::Blue);

        println!();
        self.print_panel(
            &iteration.reaction.persona.to_string(),
            &iteration.reaction.text,
            Color::Magenta,
        );

        self.print_quick_score(round, report);
    }

    fn decide(&mut self, round: &Round) -> Decision {
        self.stop_spinner();
        if !self.is_interactive() {
            return Decision::LockIn;
        }
        let items = [
            format!(
                "ITERATE - have the Creator revise (attempt {}/{})",
                round.attempt() + 1,
                round.max_attempts()
            ),
            "LOCK IN - accept this version".to_string(),
        ];
        println!();
        match Select::with_theme(&self.theme)
            .with_prompt("What do you want to do?")
            .items(&items)
            .default(0)
            .interact_on_opt(&self.term)
        {
            Ok(Some(0)) => Decision::Regenerate,
            Ok(_) => Decision::LockIn,
            Err(e) => decision_on_error(e),
        }
    }

    fn on_locked(&mut self, locked: &LockedRound) {
        self.stop_spinner();
        if locked.forced() {
            println!(
                "\n{}",
                style(format!(
                    "Max regenerations reached ({}). Locking in final version.",
                    locked.max_iterations()
                ))
                .yellow()
                .bold()
            );
        } else {
            println!(
                "\n{} Let's see the final scorecard.",
                style("LOCKED IN!").yellow().bold()
            );
        }
        self.print_scorecard(locked);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_lines_have_the_requested_width() {
        let lines = render_panel("Content Creator", "Elden Ring DLC is here. #gaming", 48);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("╭─ Content Creator ─"));
        assert!(lines.iter().all(|l| measure_text_width(l) == 48));
    }

    #[test]
    fn panel_wraps_long_bodies() {
        let body = "word ".repeat(40);
        let lines = render_panel("", &body, 40);
        assert!(lines.len() > 3);
        assert!(lines.iter().all(|l| measure_text_width(l) == 40));
    }

    #[test]
    fn panel_never_narrower_than_minimum() {
        let lines = render_panel("t", "x", 10);
        assert_eq!(measure_text_width(&lines[0]), MIN_PANEL_WIDTH);
    }

    #[test]
    fn blank_lines_in_body_are_kept() {
        let lines = render_panel("t", "first\n\nsecond", 40);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[2].trim_matches(|c| c == '│' || c == ' '), "");
    }

    #[test]
    fn long_words_are_split() {
        let chunks = split_long_word(&"#".repeat(25), 10);
        assert_eq!(chunks.iter().map(String::len).collect::<Vec<_>>(), vec![10, 10, 5]);
    }

    #[test]
    fn empty_body_still_draws_a_line() {
        assert_eq!(wrap("", 20), vec![String::new()]);
    }

    #[test]
    fn ctrl_c_at_a_menu_is_an_interrupt() {
        let err = dialoguer::Error::IO(io::Error::from(io::ErrorKind::Interrupted));
        assert!(matches!(PromptError::from(err), PromptError::Interrupted));

        let err = dialoguer::Error::IO(io::Error::from(io::ErrorKind::BrokenPipe));
        assert!(matches!(PromptError::from(err), PromptError::Terminal(_)));
    }

    #[test]
    fn ctrl_c_at_the_decision_prompt_quits() {
        let interrupted = dialoguer::Error::IO(io::Error::from(io::ErrorKind::Interrupted));
        assert_eq!(decision_on_error(interrupted), Decision::Quit);

        let broken = dialoguer::Error::IO(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert_eq!(decision_on_error(broken), Decision::LockIn);
    }

    #[test]
    fn metric_row_shows_score_and_rating() {
        let row = metric_row("Reach", 72.4);
        assert!(row.starts_with("Reach"));
        assert!(row.contains("72/100"));
        assert!(row.ends_with("Strong"));
        assert!(metric_row("Virality", 12.0).ends_with("FAIL"));
    }
}

//! formic demo - a signup form driven by the form engine
//!
//! Runs a Ratatui signup form bound to a rule-based resolver: edit fields,
//! Tab to blur-validate, Enter to submit, Ctrl+R to reset.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use formic::ui::{draw_form, BindingEvent, FieldSpec, FormBinding};
use formic::{FieldMap, FieldRules, FieldValue, FormEngine, RuleResolver};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formic=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut binding = signup_binding()?;
    let result = run_app(&mut terminal, &mut binding);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Handle any errors
    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }

    Ok(())
}

/// A signup form: username, email, numeric age, multiline bio.
fn signup_binding() -> Result<FormBinding> {
    let defaults = FieldMap::from([
        ("username".to_string(), FieldValue::text("")),
        ("email".to_string(), FieldValue::text("")),
        ("age".to_string(), FieldValue::NOT_A_NUMBER),
        ("bio".to_string(), FieldValue::text("")),
    ]);

    let resolver = RuleResolver::new()
        .field(
            "username",
            FieldRules::new().required().min_len(3).max_len(32),
        )
        .field(
            "email",
            FieldRules::new().required().check(|value| {
                let text = value.as_text().unwrap_or_default();
                match text.split_once('@') {
                    Some((user, host)) if !user.is_empty() && host.contains('.') => Ok(()),
                    _ => Err("must be a valid email address".to_string()),
                }
            }),
        )
        .field("age", FieldRules::new().finite().min(18.0).max(100.0))
        .field("bio", FieldRules::new().max_len(280));

    let engine = FormEngine::new(defaults, resolver);
    let binding = FormBinding::new(
        engine,
        vec![
            FieldSpec::text("username", "Username"),
            FieldSpec::text("email", "Email"),
            FieldSpec::numeric("age", "Age (18-100)"),
            FieldSpec::multiline("bio", "Bio (optional)"),
        ],
    )?;
    Ok(binding)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    binding: &mut FormBinding,
) -> Result<()> {
    let mut status: Option<String> = None;

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            draw_form(frame, area, binding, "Signup", status.as_deref());
        })?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.code == KeyCode::Esc {
            return Ok(());
        }

        match binding.handle_key(key)? {
            BindingEvent::Submitted { accepted: true } => {
                // the engine already ran the gate; re-read the values for display
                let fields = binding.state().fields;
                let payload = serde_json::to_string(&fields)?;
                tracing::info!(%payload, "signup accepted");
                status = Some(format!("Submitted: {payload}"));
            }
            BindingEvent::Submitted { accepted: false } => {
                status = Some("Submit blocked: fix the highlighted fields".to_string());
            }
            BindingEvent::Reset => {
                status = Some("Form reset to defaults".to_string());
            }
            BindingEvent::Edited | BindingEvent::FocusMoved => {
                status = None;
            }
            BindingEvent::Ignored => {}
        }
    }
}

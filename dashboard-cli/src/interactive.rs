//! Prompt-driven dashboard session.

use std::fmt;

use inquire::{InquireError, Select, Text};
use weather_dashboard_core::{
    Dashboard, DisplayMode, GeolocationSource, SuggestionQuery, WeatherProvider,
};

use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    SearchCity,
    UseCurrentLocation,
    ToggleUnits,
    ChangeView,
    ToggleConnectivity,
    Refresh,
    Quit,
}

impl Action {
    const ALL: [Action; 7] = [
        Action::SearchCity,
        Action::UseCurrentLocation,
        Action::ToggleUnits,
        Action::ChangeView,
        Action::ToggleConnectivity,
        Action::Refresh,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::SearchCity => "Search city",
            Action::UseCurrentLocation => "Use current location",
            Action::ToggleUnits => "Toggle °C / °F",
            Action::ChangeView => "Change view",
            Action::ToggleConnectivity => "Mark online / offline",
            Action::Refresh => "Refresh",
            Action::Quit => "Quit",
        })
    }
}

/// Run the dashboard until the user quits or cancels a prompt.
pub async fn run<P, G>(dash: &Dashboard<P, G>) -> anyhow::Result<()>
where
    P: WeatherProvider,
    G: GeolocationSource,
{
    dash.refresh().await;
    println!("{}", render::Panel(&dash.view()));

    loop {
        let action = match Select::new("What next?", Action::ALL.to_vec()).prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        let result = match action {
            Action::Quit => break,
            Action::SearchCity => search_city(dash).await,
            Action::UseCurrentLocation => {
                if let Err(err) = dash.use_current_location().await {
                    println!("Could not use the current location: {err}");
                }
                Ok(())
            }
            Action::ToggleUnits => {
                dash.toggle_unit_system().await;
                Ok(())
            }
            Action::ChangeView => change_view(dash),
            Action::ToggleConnectivity => {
                let online = dash.view_state().online;
                dash.set_online(!online);
                Ok(())
            }
            Action::Refresh => {
                dash.refresh().await;
                Ok(())
            }
        };

        match result {
            Ok(()) => {}
            Err(InquireError::OperationCanceled) => continue,
            Err(InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        }

        println!("{}", render::Panel(&dash.view()));
    }

    Ok(())
}

async fn search_city<P, G>(dash: &Dashboard<P, G>) -> Result<(), InquireError>
where
    P: WeatherProvider,
    G: GeolocationSource,
{
    let text = Text::new("City:").prompt()?;

    match dash.edit_city_text(&text).await {
        SuggestionQuery::Updated(n) if n > 0 => {
            let view = dash.view();
            let mut options: Vec<String> =
                view.suggestions.iter().map(ToString::to_string).collect();
            options.push(format!("Use \"{}\" as typed", text.trim()));

            let picked = Select::new("Pick a city:", options).raw_prompt()?;
            if picked.index < view.suggestions.len() {
                dash.select_suggestion(picked.index).await;
            } else {
                dash.submit_city().await;
            }
        }
        _ => {
            dash.submit_city().await;
        }
    }

    Ok(())
}

fn change_view<P, G>(dash: &Dashboard<P, G>) -> Result<(), InquireError>
where
    P: WeatherProvider,
    G: GeolocationSource,
{
    let current = dash.view_state().display_mode;
    let cursor = DisplayMode::all().iter().position(|m| *m == current).unwrap_or(0);

    let mode = Select::new("View:", DisplayMode::all().to_vec())
        .with_starting_cursor(cursor)
        .prompt()?;
    dash.set_display_mode(mode);

    Ok(())
}

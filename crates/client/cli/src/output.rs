//! Renders bus events for stdout.
use anyhow::Result;
use chronicle_core::TurnEvent;
use chronicle_runtime::Event;

use crate::config::EventFormat;

pub fn render(event: &Event, format: EventFormat) -> Result<String> {
    match format {
        EventFormat::Json => Ok(serde_json::to_string(event)?),
        EventFormat::Text => Ok(describe(event)),
    }
}

fn describe(event: &Event) -> String {
    match event {
        Event::Turn(TurnEvent::TurnHolderChanged { entity, is_player }) => {
            let side = if *is_player { "player" } else { "enemy" };
            format!("[turn ] {side} turn: {entity}")
        }
        Event::Turn(TurnEvent::RoundEnded { round_count }) => {
            format!("[round] round {round_count} ended")
        }
        Event::Step(step) => format!(
            "[step ] {} spent {} (t={})",
            step.entity, step.spent_time, step.total_time
        ),
    }
}

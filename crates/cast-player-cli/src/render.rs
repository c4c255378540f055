//! Text rendering of display snapshots.
//!
//! Stateless: every snapshot is rendered in full from the model alone.

use cast_player::Catalog;
use cast_player_types::{
    DisplayModel, LiveIndicator, LiveTimeline, PlayAffordance, PlaybackTarget, SkipButton,
};

const BAR_CELLS: usize = 40;

pub fn render_display(model: &DisplayModel, timeline_width: f64) -> String {
    let mut lines = Vec::new();
    let target = match model.target {
        PlaybackTarget::Local => "local".to_string(),
        PlaybackTarget::Remote => format!(
            "cast → {}",
            model.receiver_name.as_deref().unwrap_or("receiver")
        ),
    };
    lines.push(format!(
        "[{target}] #{} {} ({:?})",
        model.media_index, model.title, model.state
    ));
    if !model.subtitle.is_empty() {
        lines.push(format!("  {}", model.subtitle));
    }

    let button = match model.play_affordance {
        PlayAffordance::Play => "▶",
        PlayAffordance::Pause => "❚❚",
    };
    let time = model.current_time.as_deref().unwrap_or("--:--:--");
    let duration = model.duration.as_deref().unwrap_or("--:--:--");
    lines.push(format!(
        "  {button} {time} {} {duration}",
        progress_bar(model, timeline_width)
    ));

    let mut flags = Vec::new();
    if model.muted {
        flags.push("muted".to_string());
    } else {
        flags.push(format!("vol {:.0}%", model.volume * 100.0));
    }
    if !model.seek_enabled {
        flags.push("seek locked".to_string());
    }
    if model.fullscreen_available {
        flags.push(if model.fullscreen { "fullscreen" } else { "windowed" }.to_string());
    }
    match model.live_indicator {
        LiveIndicator::Hidden => {}
        LiveIndicator::Active => flags.push("● LIVE".to_string()),
        LiveIndicator::Inactive => flags.push("○ live".to_string()),
    }
    match model.skip_button {
        SkipButton::Hidden => {}
        SkipButton::Countdown { seconds } => flags.push(format!("skip in {seconds}s")),
        SkipButton::Visible => flags.push("skip ad ⏭".to_string()),
    }
    lines.push(format!("  {}", flags.join(" | ")));

    if let Some(error) = model.error.as_deref() {
        lines.push(format!("  error: {error}"));
    }
    lines.join("\n")
}

/// Fixed-width bar with ad markers (`|`) and the live window overlay (`░`).
fn progress_bar(model: &DisplayModel, timeline_width: f64) -> String {
    let cell = |pixel: f64| -> usize {
        if timeline_width <= 0.0 {
            return 0;
        }
        let ratio = (pixel / timeline_width).clamp(0.0, 1.0);
        ((ratio * BAR_CELLS as f64).round() as usize).min(BAR_CELLS)
    };
    let filled = cell(model.progress_width);
    let mut cells: Vec<char> = (0..BAR_CELLS)
        .map(|i| if i < filled { '━' } else { '─' })
        .collect();
    if let Some(LiveTimeline {
        seekable_width,
        unseekable_width,
    }) = model.live_timeline
    {
        let seekable_end = cell(seekable_width);
        for (i, slot) in cells.iter_mut().enumerate() {
            if i < cell(unseekable_width) || i >= seekable_end {
                *slot = '░';
            }
        }
    }
    for marker in &model.ad_markers {
        let index = cell(*marker).min(BAR_CELLS - 1);
        cells[index] = '|';
    }
    format!("[{}]", cells.into_iter().collect::<String>())
}

pub fn render_catalog(catalog: &Catalog) -> String {
    let mut lines: Vec<String> = catalog
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let duration = item
                .duration
                .map(cast_player::time_format::format_media_time)
                .unwrap_or_else(|| "--:--:--".to_string());
            format!("  {index:>2}  {duration}  {}", item.title)
        })
        .collect();
    if let Some(live) = catalog.live() {
        lines.push(format!("  live  {}", live.item.title));
    }
    lines.join("\n")
}

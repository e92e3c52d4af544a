//! TUI rendering.
//!
//! Header with the draw button and radius, then either the restaurant list
//! or a marker map, with the location picker drawn on top when open.

use crate::app::{App, LocationModal, ModalFocus, ViewMode};
use crate::details::DetailView;
use crate::geo::{RankedPlace, EARTH_RADIUS_M};
use crate::models::{maps_url, PlaceDetails};
use crate::search::radius_label;
use crate::status::{resolve_place, OpenStatus};
use chrono::Utc;
use ratatui::{
    prelude::*,
    widgets::{canvas::*, *},
};

use ratatui::text::Line;

const HIGHLIGHT: Color = Color::Rgb(30, 30, 60);

/// Renders one frame of the TUI from the current application state.
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(1)])
        .split(f.size());

    render_header(f, app, chunks[0]);
    match app.view_mode {
        ViewMode::List => render_list_view(f, app, chunks[1]),
        ViewMode::Map => render_map_view(f, app, chunks[1]),
    }
    render_footer(f, app, chunks[2]);

    if let Some(modal) = &app.modal {
        render_location_modal(f, app, modal);
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let address = app
        .location()
        .map(|l| l.address.as_str())
        .unwrap_or("Set location");

    let button = if app.is_drawing() {
        Span::styled(" Choosing... ", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(" 🎲 Roll [r] ", Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD))
    };

    let food = match app.display_food {
        Some(food) => vec![
            Span::styled(food.query, bold().fg(Color::Yellow)),
            Span::styled(format!("  {}", food.category), Style::default().fg(Color::DarkGray)),
        ],
        None => vec![Span::styled("Pick something", Style::default().fg(Color::DarkGray))],
    };

    let mut roll_line = vec![button, Span::raw("   ")];
    roll_line.extend(food);
    if app.is_searching {
        roll_line.push(Span::styled("   searching…", Style::default().fg(Color::Cyan)));
    }

    let lines = vec![
        Line::from(vec![
            Span::styled("📍 ", Style::default()),
            Span::styled(address, Style::default().fg(Color::Cyan)),
            Span::raw("  │  "),
            Span::styled("RADIUS: ", bold()),
            Span::raw(radius_label(app.radius)),
            Span::styled("  [-/+]", Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
        Line::from(roll_line),
    ];

    let header = Paragraph::new(lines).block(
        Block::default()
            .title(" What should I eat today? ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(header, area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let text = match &app.status_message {
        Some(msg) => Span::styled(msg.as_str(), Style::default().fg(Color::Yellow)),
        None => Span::styled(
            " r roll   ↑/↓ select   Enter details   m map/list   l location   -/+ radius   q quit",
            Style::default().fg(Color::DarkGray),
        ),
    };
    f.render_widget(Paragraph::new(Line::from(text)), area);
}

fn status_span(status: OpenStatus) -> Span<'static> {
    let color = match status {
        OpenStatus::Open => Color::Green,
        OpenStatus::Closed => Color::Red,
        OpenStatus::Unknown => Color::DarkGray,
    };
    Span::styled(status.label(), Style::default().fg(color))
}

fn render_list_view(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" Restaurants ({}) ", app.ranked.len()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    if app.location().is_none() {
        let p = Paragraph::new("Set a location first (press l).")
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(p, area);
        return;
    }
    if app.ranked.is_empty() {
        let msg = if app.is_searching {
            "Searching nearby…"
        } else {
            "No restaurants yet. Roll for a dish first."
        };
        let p = Paragraph::new(msg).alignment(Alignment::Center).block(block);
        f.render_widget(p, area);
        return;
    }

    let now = Utc::now();
    let items: Vec<ListItem> = app
        .ranked
        .iter()
        .enumerate()
        .map(|(i, ranked)| {
            let selected = i == app.selected_index;
            let mut lines = place_summary(ranked, app.details.cached(&ranked.place.place_id), now, selected);
            lines.extend(detail_lines(ranked, app.details.view(&ranked.place.place_id)));
            ListItem::new(lines)
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(app.selected_index));
    let list = List::new(items).block(block);
    f.render_stateful_widget(list, area, &mut state);
}

fn place_summary(
    ranked: &RankedPlace,
    details: Option<&PlaceDetails>,
    now: chrono::DateTime<Utc>,
    selected: bool,
) -> Vec<Line<'static>> {
    let place = &ranked.place;
    let name_style = if selected {
        bold().fg(Color::Cyan).bg(HIGHLIGHT)
    } else {
        bold()
    };

    let mut first = vec![Span::styled(format!(" {} ", place.name), name_style)];
    if let Some(rating) = place.rating {
        first.push(Span::styled(format!(" ★ {rating}"), Style::default().fg(Color::Yellow)));
    }
    if let Some(level) = place.price_level {
        first.push(Span::styled(
            format!("  {}", "$".repeat(level as usize)),
            Style::default().fg(Color::Green),
        ));
    }
    if let Some(label) = ranked.distance_label() {
        first.push(Span::styled(format!("  {label}"), Style::default().fg(Color::Cyan)));
    }

    let mut second = vec![Span::raw("   "), status_span(resolve_place(place, details, now))];
    if let Some(total) = place.user_ratings_total {
        second.push(Span::styled(format!("  ({total} reviews)"), Style::default().fg(Color::DarkGray)));
    }
    if let Some(vicinity) = &place.vicinity {
        second.push(Span::styled(format!("  {vicinity}"), Style::default().fg(Color::DarkGray)));
    }

    vec![Line::from(first), Line::from(second)]
}

fn detail_lines(ranked: &RankedPlace, view: DetailView<'_>) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    match view {
        DetailView::Collapsed => Vec::new(),
        DetailView::Loading => vec![Line::from(Span::styled("     Loading details…", dim))],
        DetailView::Failed => vec![Line::from(Span::styled(
            "     Could not load details. Press Enter twice to retry.",
            Style::default().fg(Color::Red),
        ))],
        DetailView::Loaded(details) => {
            let mut lines = Vec::new();
            if !details.photos.is_empty() {
                lines.push(Line::from(format!("     📷 {} photos", details.photos.len())));
            }
            if let Some(phone) = &details.formatted_phone_number {
                lines.push(Line::from(format!("     📞 {phone}")));
            }
            if let Some(website) = &details.website {
                lines.push(Line::from(format!("     🌐 {website}")));
            }
            for review in details.reviews.iter().take(3) {
                let stars = review.rating.map(|r| "★".repeat(r as usize)).unwrap_or_default();
                let when = review.relative_time_description.clone().unwrap_or_default();
                lines.push(Line::from(vec![
                    Span::styled(format!("     {} ", review.author_name), bold()),
                    Span::styled(stars, Style::default().fg(Color::Yellow)),
                    Span::styled(format!(" {when}"), dim),
                ]));
                let text: String = review.text.chars().take(160).collect();
                lines.push(Line::from(Span::styled(format!("       {text}"), dim)));
            }
            if let Some(url) = maps_url(&ranked.place) {
                lines.push(Line::from(Span::styled(format!("     ↗ {url}"), Style::default().fg(Color::Blue))));
            }
            lines
        }
    }
}

/// Degrees of latitude covering `meters`.
fn meters_to_degrees(meters: f64) -> f64 {
    (meters / EARTH_RADIUS_M).to_degrees()
}

fn render_map_view(f: &mut Frame, app: &App, area: Rect) {
    let center = app
        .location()
        .map(|l| l.coordinate())
        .unwrap_or_else(|| app.fallback_center());
    let span = meters_to_degrees(app.radius as f64) * 1.3;

    let canvas = Canvas::default()
        .block(Block::bordered().title(" Map "))
        .marker(symbols::Marker::Braille)
        .x_bounds([center.lng - span, center.lng + span])
        .y_bounds([center.lat - span, center.lat + span])
        .paint(|ctx| {
            ctx.draw(&Circle {
                x: center.lng,
                y: center.lat,
                radius: meters_to_degrees(app.radius as f64),
                color: Color::DarkGray,
            });

            for (i, ranked) in app.ranked.iter().enumerate() {
                let Some(at) = ranked.place.coordinate() else {
                    continue;
                };
                if i == app.selected_index {
                    ctx.print(
                        at.lng,
                        at.lat,
                        Line::from(Span::styled(
                            format!("● {}", ranked.place.name),
                            Style::default().fg(Color::Black).bg(Color::Yellow),
                        )),
                    );
                } else {
                    ctx.print(at.lng, at.lat, Line::from(Span::styled("●", Style::default().fg(Color::Red))));
                }
            }

            if app.location().is_some() {
                ctx.print(
                    center.lng,
                    center.lat,
                    Line::from(Span::styled(" ⌖ me", Style::default().fg(Color::Cyan))),
                );
            }
        });

    f.render_widget(canvas, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn section(title: &str, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(style)
}

fn render_location_modal(f: &mut Frame, app: &App, modal: &LocationModal) {
    let area = centered_rect(70, 85, f.size());
    f.render_widget(Clear, area);

    let outer = Block::default()
        .title(" Set your location ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(inner);

    // 1. Device location
    let current = Paragraph::new(if modal.busy && modal.focus == ModalFocus::CurrentLocation {
        "Locating…"
    } else {
        "Press Enter to use your current location"
    })
    .block(section("1 · Current location", modal.focus == ModalFocus::CurrentLocation));
    f.render_widget(current, chunks[0]);

    // 2. Address search
    let mut address_lines = vec![Line::from(vec![
        Span::raw("> "),
        Span::styled(modal.input.clone(), bold()),
        Span::styled("▏", Style::default().fg(Color::Cyan)),
    ])];
    if modal.busy && modal.focus == ModalFocus::Address {
        address_lines.push(Line::from(Span::styled("Searching…", Style::default().fg(Color::DarkGray))));
    }
    for (i, suggestion) in modal.suggestions.iter().take(4).enumerate() {
        let style = if i == modal.suggestion_index {
            Style::default().fg(Color::Cyan).bg(HIGHLIGHT)
        } else {
            Style::default()
        };
        address_lines.push(Line::from(Span::styled(format!("  {}", suggestion.description), style)));
    }
    let address = Paragraph::new(address_lines)
        .block(section("2 · Search an address (e.g. Taipei 101)", modal.focus == ModalFocus::Address));
    f.render_widget(address, chunks[1]);

    // 3. Map pick
    let cursor = modal.cursor;
    let span = meters_to_degrees(800.0);
    let chosen = app.location().map(|l| l.coordinate());
    let map = Canvas::default()
        .block(section("3 · Pick on the map (arrows, Enter)", modal.focus == ModalFocus::Map))
        .marker(symbols::Marker::Braille)
        .x_bounds([cursor.lng - span, cursor.lng + span])
        .y_bounds([cursor.lat - span, cursor.lat + span])
        .paint(move |ctx| {
            if let Some(at) = chosen {
                ctx.print(at.lng, at.lat, Line::from(Span::styled("●", Style::default().fg(Color::Red))));
            }
            ctx.print(cursor.lng, cursor.lat, Line::from(Span::styled("+", bold().fg(Color::Cyan))));
        });
    f.render_widget(map, chunks[2]);

    // Current choice
    let mut summary = vec![Line::from(vec![
        Span::raw("Selected: "),
        Span::styled(
            app.location().map(|l| l.address.clone()).unwrap_or_else(|| "Nothing yet".to_string()),
            bold(),
        ),
    ])];
    if let Some(loc) = app.location() {
        summary.push(Line::from(Span::styled(
            format!("({:.6}, {:.6})   c confirm", loc.lat, loc.lng),
            Style::default().fg(Color::DarkGray),
        )));
    }
    summary.push(Line::from(Span::styled(
        "Tab switch   Esc close",
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(Paragraph::new(summary), chunks[3]);
}

//! TV display rendering.
//!
//! One frame shows the current company header, a grid of order cards for
//! the visible page, and a footer gauge counting down to the next advance.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::domain::{Order, OrderPriority, OrderStatus};
use crate::rotation::RotationView;

/// Cards per grid row.
const CARDS_PER_ROW: usize = 3;

/// Render one full frame from a rotation snapshot.
pub fn draw(frame: &mut Frame, view: &RotationView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], view);
    draw_cards(frame, chunks[1], &view.current_items);
    draw_footer(frame, chunks[2], view);
}

fn draw_header(frame: &mut Frame, area: Rect, view: &RotationView) {
    let company = view.current_company.as_deref().unwrap_or("No orders");
    let line = Line::from(vec![
        Span::styled(
            company.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("page {}/{}", view.current_page, view.total_pages),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(
            format!("company {}/{}", view.company_index + 1, view.total_companies.max(1)),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" Production Board "));
    frame.render_widget(header, area);
}

fn draw_cards(frame: &mut Frame, area: Rect, orders: &[Order]) {
    if orders.is_empty() {
        let empty = Paragraph::new("Nothing scheduled")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let rows = orders.len().div_ceil(CARDS_PER_ROW);
    let row_constraints = vec![Constraint::Ratio(1, rows as u32); rows];
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(row_constraints)
        .split(area);

    for (row_index, chunk) in orders.chunks(CARDS_PER_ROW).enumerate() {
        let col_constraints = vec![Constraint::Ratio(1, CARDS_PER_ROW as u32); CARDS_PER_ROW];
        let col_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(col_constraints)
            .split(row_areas[row_index]);

        for (col_index, order) in chunk.iter().enumerate() {
            draw_card(frame, col_areas[col_index], order);
        }
    }
}

fn draw_card(frame: &mut Frame, area: Rect, order: &Order) {
    let border_style = Style::default().fg(priority_color(order.priority));

    let lines = vec![
        Line::from(Span::styled(
            order.part_name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(order.status.to_string(), Style::default().fg(status_color(order.status))),
            Span::raw("  "),
            Span::styled(
                order.priority.to_string(),
                Style::default().fg(priority_color(order.priority)),
            ),
        ]),
        Line::from(Span::raw(format!(
            "{}/{} ({}%)",
            order.quantity_completed,
            order.quantity_total,
            order.progress_pct()
        ))),
        Line::from(Span::styled(
            order.created_at.format("%Y-%m-%d").to_string(),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let card = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" #{} ", order.id)),
    );
    frame.render_widget(card, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, view: &RotationView) {
    let what = if view.is_last_page && view.total_companies > 1 {
        "next company"
    } else if view.total_pages > 1 {
        "next page"
    } else {
        "refresh"
    };
    let label = format!("{} in {:.0}s", what, view.next_company_in.as_secs_f64());

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio((view.progress / 100.0).clamp(0.0, 1.0))
        .label(label);
    frame.render_widget(gauge, area);
}

fn priority_color(priority: OrderPriority) -> Color {
    match priority {
        OrderPriority::Critical => Color::Red,
        OrderPriority::High => Color::Yellow,
        OrderPriority::Normal => Color::White,
        OrderPriority::Low => Color::DarkGray,
    }
}

fn status_color(status: OrderStatus) -> Color {
    match status {
        OrderStatus::Scheduled => Color::Blue,
        OrderStatus::Production => Color::Green,
        OrderStatus::Quality => Color::Magenta,
        OrderStatus::Hold => Color::Red,
    }
}

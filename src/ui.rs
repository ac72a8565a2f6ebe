use crate::catalog::CompletionKind;
use crate::models::{TaskView, TeamSummary, TodayResponse, UserProfile, WeeklyResponse};
use crate::names::display_name;
use chrono::NaiveDate;
use std::fmt::Write;

pub fn render_index(
    date: NaiveDate,
    users: &[UserProfile],
    selected: Option<&(TodayResponse, WeeklyResponse)>,
    team: &TeamSummary,
) -> String {
    let selected_id = selected.map(|(today, _)| today.user.id.as_str());
    let (today_html, weekly_html) = match selected {
        Some((today, weekly)) => (render_today(today), render_weekly(weekly)),
        None => (
            "<p class=\"muted\">Pick a user or sign up to see today's tasks.</p>".to_string(),
            String::new(),
        ),
    };

    INDEX_HTML
        .replace("{{DATE}}", &date.format("%A, %B %-d").to_string())
        .replace("{{USERS}}", &render_user_links(users, selected_id))
        .replace("{{TODAY}}", &today_html)
        .replace("{{WEEKLY}}", &weekly_html)
        .replace("{{TEAM}}", &render_team(team))
}

fn render_user_links(users: &[UserProfile], selected: Option<&str>) -> String {
    let mut html = String::new();
    for user in users {
        let class = if Some(user.id.as_str()) == selected { "chip active" } else { "chip" };
        let _ = write!(
            html,
            "<a class=\"{class}\" href=\"/?user={id}\">{name}</a>",
            id = escape(&user.id),
            name = escape(&display_name(Some(user), &user.id)),
        );
    }
    html
}

fn render_today(today: &TodayResponse) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<div class=\"rate\"><span class=\"value\">{pct}%</span><span class=\"muted\">{done} of {total} tasks done</span></div>\
         <div class=\"bar\"><div style=\"width: {pct}%\"></div></div><ul class=\"tasks\">",
        pct = today.progress.percentage,
        done = today.progress.completed,
        total = today.progress.total,
    );
    for task in &today.tasks {
        html.push_str(&render_task(&today.user.id, task));
    }
    html.push_str("</ul>");
    html
}

fn render_task(user_id: &str, task: &TaskView) -> String {
    let template = &task.template;
    let state = if task.satisfied { "done" } else { "open" };
    let mut html = String::new();

    let summary = match task.stats {
        Some(stats) if stats.kind == CompletionKind::AllOf => {
            format!("{} of {} completed", stats.completed, stats.total)
        }
        Some(stats) => {
            let status = if task.satisfied { "done" } else { "not done" };
            format!("any one of {}: {status}", stats.total)
        }
        None => String::new(),
    };

    let _ = write!(
        html,
        "<li class=\"task {state}\"><div class=\"task-head\"><span class=\"icon\">{icon}</span>\
         <span class=\"name\">{name}</span><span class=\"muted\">{summary}</span>",
        icon = escape(&template.icon),
        name = escape(&template.name),
    );

    if !template.kind.is_composite() {
        if let Some(row) = task.rows.iter().find(|row| row.parent_id.is_none()) {
            html.push_str(&toggle_button(user_id, row.id, row.completed));
        }
        html.push_str("</div></li>");
        return html;
    }

    html.push_str("</div><ul class=\"subtasks\">");
    for sub in &template.subtasks {
        let row = task.rows.iter().find(|row| row.task_id == sub.id);
        let label = match &sub.link {
            Some(link) => format!("<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>", escape(link), escape(&sub.name)),
            None => escape(&sub.name),
        };
        let button = row
            .map(|row| toggle_button(user_id, row.id, row.completed))
            .unwrap_or_default();
        let class = if row.is_some_and(|row| row.completed) { "done" } else { "open" };
        let _ = write!(html, "<li class=\"{class}\"><span>{label}</span>{button}</li>");
    }
    html.push_str("</ul></li>");
    html
}

fn toggle_button(user_id: &str, row_id: u64, completed: bool) -> String {
    let label = if completed { "Undo" } else { "Done" };
    format!(
        "<form method=\"post\" action=\"/tasks/{user}/{row_id}/toggle\"><button type=\"submit\">{label}</button></form>",
        user = escape(user_id),
    )
}

fn render_weekly(weekly: &WeeklyResponse) -> String {
    let mut html = String::from("<div class=\"week\">");
    for point in &weekly.points {
        let _ = write!(
            html,
            "<div class=\"day\" title=\"{done}/{total}\"><div class=\"column\"><div style=\"height: {pct}%\"></div></div>\
             <span>{label}</span><span class=\"muted\">{pct}%</span></div>",
            done = point.completed,
            total = point.total,
            pct = point.percentage,
            label = escape(&point.label),
        );
    }
    let _ = write!(
        html,
        "</div><p class=\"streak\">Current streak: <strong>{}</strong> &middot; Best this week: <strong>{}</strong></p>",
        weekly.streak.current, weekly.streak.best,
    );
    html
}

fn render_team(team: &TeamSummary) -> String {
    if team.members.is_empty() {
        return "<p class=\"muted\">Nobody has started today yet.</p>".to_string();
    }
    let mut html = format!(
        "<p>Team average: <strong>{}%</strong></p><table><thead><tr><th>Member</th><th>Done</th><th>Rate</th></tr></thead><tbody>",
        team.average
    );
    for member in &team.members {
        let star = if team.top_performers.contains(&member.user_id) { " ⭐" } else { "" };
        let _ = write!(
            html,
            "<tr><td>{name}{star}</td><td>{done}/{total}</td><td>{pct}%</td></tr>",
            name = escape(&member.display_name),
            done = member.completed,
            total = member.total,
            pct = member.percentage,
        );
    }
    html.push_str("</tbody></table><ul class=\"categories\">");
    for category in &team.categories {
        let _ = write!(
            html,
            "<li>{icon} {name}: {satisfied}/{users} members</li>",
            icon = escape(&category.icon),
            name = escape(&category.name),
            satisfied = category.satisfied_users,
            users = category.user_count,
        );
    }
    html.push_str("</ul>");
    html
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Daily Tasks</title>
  <style>
    :root {
      --paper: #f4f1ea;
      --ink: #1f2a30;
      --muted: #7b8288;
      --done: #3a8f6b;
      --open: #d9822b;
      --card: #ffffff;
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      background: var(--paper);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 28px 16px 48px;
    }

    main {
      max-width: 920px;
      margin: 0 auto;
      display: grid;
      gap: 20px;
    }

    section {
      background: var(--card);
      border-radius: 16px;
      padding: 22px 24px;
      box-shadow: 0 10px 30px rgba(31, 42, 48, 0.08);
    }

    h1 { margin: 0; font-size: 2rem; }
    h2 { margin: 0 0 12px; font-size: 1.15rem; }
    .muted { color: var(--muted); font-size: 0.9rem; }

    .chip {
      display: inline-block;
      padding: 6px 12px;
      margin: 0 6px 6px 0;
      border-radius: 999px;
      background: #e8e4da;
      color: var(--ink);
      text-decoration: none;
    }

    .chip.active { background: var(--ink); color: white; }

    .rate { display: flex; align-items: baseline; gap: 12px; }
    .rate .value { font-size: 2.4rem; font-weight: 700; }

    .bar { height: 8px; background: #ece8df; border-radius: 4px; overflow: hidden; margin: 8px 0 16px; }
    .bar div { height: 100%; background: var(--done); }

    ul.tasks, ul.subtasks, ul.categories { list-style: none; margin: 0; padding: 0; }
    .task { border-left: 4px solid var(--open); padding: 10px 12px; margin-bottom: 10px; background: #faf8f4; border-radius: 8px; }
    .task.done { border-left-color: var(--done); }
    .task-head { display: flex; align-items: center; gap: 10px; }
    .task-head .name { font-weight: 600; flex: 1; }
    .subtasks li { display: flex; justify-content: space-between; align-items: center; padding: 6px 0 0 34px; }
    .subtasks li.done span { text-decoration: line-through; color: var(--muted); }

    form { margin: 0; }
    button {
      border: none;
      border-radius: 8px;
      padding: 6px 12px;
      background: var(--ink);
      color: white;
      cursor: pointer;
    }

    .week { display: grid; grid-template-columns: repeat(7, 1fr); gap: 10px; }
    .day { display: grid; justify-items: center; gap: 4px; }
    .column { height: 120px; width: 26px; background: #ece8df; border-radius: 6px; display: flex; align-items: flex-end; overflow: hidden; }
    .column div { width: 100%; background: var(--done); }

    table { width: 100%; border-collapse: collapse; margin-bottom: 12px; }
    th, td { text-align: left; padding: 6px 4px; border-bottom: 1px solid #ece8df; }

    input { padding: 6px 10px; border-radius: 8px; border: 1px solid #d5d0c5; }
  </style>
</head>
<body>
  <main>
    <section>
      <h1>Daily Tasks</h1>
      <p class="muted">{{DATE}}</p>
      <div>{{USERS}}</div>
      <form method="post" action="/users">
        <input name="email" type="email" placeholder="you@example.com" required />
        <input name="name" type="text" placeholder="Name (optional)" />
        <button type="submit">Sign up / sign in</button>
      </form>
    </section>

    <section>
      <h2>Today</h2>
      {{TODAY}}
    </section>

    <section>
      <h2>This week</h2>
      {{WEEKLY}}
    </section>

    <section>
      <h2>Team</h2>
      {{TEAM}}
    </section>
  </main>
</body>
</html>
"#;

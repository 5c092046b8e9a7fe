use crate::models::LogEntry;

pub fn render_log_page(projects: &[String], signed_in: bool, session_count: usize) -> String {
    LOG_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{NAV}}", &nav(signed_in))
        .replace("{{SESSION_BANNER}}", &session_banner(signed_in, session_count))
        .replace("{{PROJECT_OPTIONS}}", &datalist_options(projects))
}

pub fn render_history_page(entries: &[LogEntry], signed_in: bool) -> String {
    let rows = if entries.is_empty() {
        "<p class=\"empty\">No logs yet. Start by recording today's work.</p>".to_string()
    } else {
        entries.iter().map(history_card).collect::<Vec<_>>().join("\n")
    };
    HISTORY_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{NAV}}", &nav(signed_in))
        .replace("{{ROWS}}", &rows)
}

pub fn render_stats_page(projects: &[String], signed_in: bool) -> String {
    let options = projects
        .iter()
        .map(|name| format!("<option value=\"{0}\">{0}</option>", escape(name)))
        .collect::<Vec<_>>()
        .join("\n");
    STATS_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{NAV}}", &nav(signed_in))
        .replace("{{PROJECT_OPTIONS}}", &options)
}

pub fn render_edit_page(entry: &LogEntry, signed_in: bool) -> String {
    EDIT_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{NAV}}", &nav(signed_in))
        .replace("{{ID}}", &escape(&entry.id))
        .replace("{{PROJECT}}", &escape(&entry.project))
        .replace("{{AMOUNT}}", &entry.work_time.amount.to_string())
        .replace("{{UNIT}}", entry.work_time.unit.as_str())
        .replace("{{GAINS}}", &escape(&entry.gains))
        .replace("{{CHALLENGES}}", &escape(&entry.challenges))
        .replace("{{PLAN}}", &escape(&entry.plan))
}

fn history_card(entry: &LogEntry) -> String {
    format!(
        r#"<article class="card">
  <header>
    <h2>{project}</h2>
    <span class="date">{date}</span>
  </header>
  <p class="duration">{duration}</p>
  <dl>
    <dt>Gains</dt><dd>{gains}</dd>
    <dt>Challenges</dt><dd>{challenges}</dd>
    <dt>Plan</dt><dd>{plan}</dd>
  </dl>
  <footer>
    <a class="edit" href="/edit/{id}">Edit</a>
    <button class="delete" data-id="{id}">Delete</button>
  </footer>
</article>"#,
        project = escape(&entry.project),
        date = entry.created_at.format("%Y-%m-%d"),
        duration = format_minutes(entry.work_time.total_minutes()),
        gains = escape(&entry.gains),
        challenges = escape(&entry.challenges),
        plan = escape(&entry.plan),
        id = escape(&entry.id),
    )
}

fn nav(signed_in: bool) -> String {
    let badge = if signed_in { "cloud" } else { "anonymous" };
    format!(
        r#"<nav>
  <a href="/">Log</a>
  <a href="/history">History</a>
  <a href="/stats">Stats</a>
  <span class="badge">{badge}</span>
</nav>"#
    )
}

fn session_banner(signed_in: bool, session_count: usize) -> String {
    if session_count == 0 {
        return String::new();
    }
    if signed_in {
        format!(
            r#"<div class="banner">
  <p>{session_count} log(s) from this session are not in the cloud yet.</p>
  <button id="migrate">Save to cloud</button>
  <a href="/export">Download as JSON</a>
</div>"#
        )
    } else {
        format!(
            r#"<div class="banner">
  <p>{session_count} log(s) live only in this session and will be lost when it ends.</p>
  <a href="/export">Download as JSON</a>
</div>"#
        )
    }
}

fn datalist_options(projects: &[String]) -> String {
    projects
        .iter()
        .map(|name| format!("<option value=\"{}\">", escape(name)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_minutes(total: u64) -> String {
    let hours = total / 60;
    let minutes = total % 60;
    match (hours, minutes) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} h"),
        (h, m) => format!("{h} h {m} min"),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const STYLE: &str = r#"
    :root {
      --ink: #1f2933;
      --accent: #0d9488;
      --accent-dark: #0f766e;
      --bg: #f8fafc;
      --card: #ffffff;
      --muted: #64748b;
      --danger: #dc2626;
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", "Helvetica Neue", sans-serif;
      padding: 24px 16px 48px;
    }

    main {
      width: min(720px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 20px;
    }

    nav {
      display: flex;
      gap: 16px;
      align-items: center;
      padding-bottom: 8px;
      border-bottom: 1px solid #e2e8f0;
    }

    nav a { color: var(--accent-dark); font-weight: 600; text-decoration: none; }
    nav .badge {
      margin-left: auto;
      font-size: 0.8rem;
      color: var(--muted);
      border: 1px solid #e2e8f0;
      border-radius: 999px;
      padding: 2px 10px;
    }

    h1 { margin: 0; font-size: 1.6rem; }

    .card, form, .banner, .panel {
      background: var(--card);
      border: 1px solid #e2e8f0;
      border-radius: 12px;
      padding: 20px;
    }

    .banner { display: flex; gap: 12px; align-items: center; flex-wrap: wrap; }
    .banner p { margin: 0; color: var(--muted); }

    label { display: grid; gap: 6px; font-weight: 600; font-size: 0.9rem; }
    form { display: grid; gap: 14px; }

    input, textarea, select {
      font: inherit;
      padding: 9px 10px;
      border: 1px solid #cbd5e1;
      border-radius: 8px;
    }

    textarea { min-height: 84px; resize: vertical; }

    .time-row { display: flex; gap: 10px; }
    .time-row label { flex: 1; }

    button {
      font: inherit;
      font-weight: 600;
      border: none;
      border-radius: 8px;
      padding: 10px 18px;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    button:hover { background: var(--accent-dark); }
    button.delete { background: transparent; color: var(--danger); padding: 4px 8px; }

    .status { min-height: 1.2em; font-size: 0.9rem; }
    .status.error { color: var(--danger); }
    .status.ok { color: var(--accent-dark); }

    .card header { display: flex; justify-content: space-between; align-items: baseline; }
    .card h2 { margin: 0; font-size: 1.1rem; }
    .card .date, .card .duration { color: var(--muted); font-size: 0.9rem; }
    .card dl { margin: 10px 0 0; }
    .card dt { font-weight: 600; font-size: 0.85rem; color: var(--muted); margin-top: 8px; }
    .card dd { margin: 2px 0 0; white-space: pre-wrap; }
    .card footer { margin-top: 12px; display: flex; gap: 12px; align-items: center; }
    .card .edit { color: var(--accent-dark); font-weight: 600; text-decoration: none; }

    .empty { color: var(--muted); text-align: center; }

    .metrics { display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); gap: 12px; }
    .metric { background: var(--card); border: 1px solid #e2e8f0; border-radius: 12px; padding: 16px; }
    .metric .label { display: block; font-size: 0.8rem; color: var(--muted); text-transform: uppercase; letter-spacing: 0.08em; }
    .metric .value { display: block; font-size: 1.5rem; font-weight: 700; margin-top: 6px; }
"#;

const LOG_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Daily Log</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main>
    {{NAV}}
    <h1>Today's work log</h1>
    {{SESSION_BANNER}}
    <form id="log-form">
      <label>Project
        <input name="project" list="projects" required placeholder="What did you work on?" />
        <datalist id="projects">{{PROJECT_OPTIONS}}</datalist>
      </label>
      <div class="time-row">
        <label>Hours <input name="hours" type="number" min="0" value="0" /></label>
        <label>Minutes <input name="minutes" type="number" min="0" max="59" value="0" /></label>
      </div>
      <label>Gains <textarea name="gains" placeholder="What did you get done? (at least 30 characters)"></textarea></label>
      <label>Challenges <textarea name="challenges" placeholder="What was hard? (at least 30 characters)"></textarea></label>
      <label>Plan <textarea name="plan" placeholder="What's next? (at least 30 characters)"></textarea></label>
      <button type="submit">Save log</button>
      <p id="status" class="status"></p>
    </form>
  </main>
  <script>
    const form = document.getElementById('log-form');
    const status = document.getElementById('status');

    const setStatus = (message, kind) => {
      status.textContent = message;
      status.className = 'status' + (kind ? ' ' + kind : '');
    };

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      const data = new FormData(form);
      const hours = parseInt(data.get('hours') || '0', 10);
      const minutes = parseInt(data.get('minutes') || '0', 10);
      const payload = {
        project: data.get('project'),
        workTime: { amount: hours * 60 + minutes, unit: 'minutes' },
        gains: data.get('gains'),
        challenges: data.get('challenges'),
        plan: data.get('plan')
      };

      setStatus('Saving...', '');
      const res = await fetch('/api/logs', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(payload)
      });

      if (res.ok) {
        form.reset();
        setStatus('Saved', 'ok');
      } else {
        setStatus(await res.text() || 'Save failed', 'error');
      }
    });

    const migrate = document.getElementById('migrate');
    if (migrate) {
      migrate.addEventListener('click', async () => {
        const res = await fetch('/api/migrate', { method: 'POST' });
        if (res.ok) {
          const report = await res.json();
          alert('Saved ' + report.migrated + ' log(s) to the cloud, ' + report.failed + ' failed.');
          location.reload();
        } else {
          alert(await res.text() || 'Migration failed');
        }
      });
    }
  </script>
</body>
</html>
"#;

const HISTORY_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>History - Daily Log</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main>
    {{NAV}}
    <h1>History</h1>
    {{ROWS}}
  </main>
  <script>
    document.querySelectorAll('button.delete').forEach((button) => {
      button.addEventListener('click', async () => {
        if (!confirm('Delete this log? This cannot be undone.')) {
          return;
        }
        const res = await fetch('/api/logs/' + button.dataset.id, { method: 'DELETE' });
        if (res.ok) {
          location.reload();
        } else {
          alert(await res.text() || 'Delete failed');
        }
      });
    });
  </script>
</body>
</html>
"#;

const STATS_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Stats - Daily Log</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main>
    {{NAV}}
    <h1>Project stats</h1>
    <div class="panel">
      <label>Project
        <select id="project">
          <option value="">Choose a project</option>
          {{PROJECT_OPTIONS}}
        </select>
      </label>
    </div>
    <div class="metrics">
      <div class="metric"><span class="label">Total time</span><span class="value" id="total">-</span></div>
      <div class="metric"><span class="label">Working days</span><span class="value" id="days">-</span></div>
      <div class="metric"><span class="label">Current streak</span><span class="value" id="streak">-</span></div>
    </div>
  </main>
  <script>
    const select = document.getElementById('project');

    const formatMinutes = (total) => {
      const hours = Math.floor(total / 60);
      const minutes = total % 60;
      if (hours === 0) return minutes + ' min';
      if (minutes === 0) return hours + ' h';
      return hours + ' h ' + minutes + ' min';
    };

    select.addEventListener('change', async () => {
      if (!select.value) {
        for (const id of ['total', 'days', 'streak']) {
          document.getElementById(id).textContent = '-';
        }
        return;
      }
      const res = await fetch('/api/stats?project=' + encodeURIComponent(select.value));
      if (!res.ok) {
        alert(await res.text() || 'Failed to load stats');
        return;
      }
      const stats = await res.json();
      document.getElementById('total').textContent = formatMinutes(stats.total_minutes);
      document.getElementById('days').textContent = stats.working_days;
      document.getElementById('streak').textContent = stats.streak + ' day(s)';
    });
  </script>
</body>
</html>
"#;

const EDIT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Edit - Daily Log</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main>
    {{NAV}}
    <h1>Edit log</h1>
    <form id="edit-form" data-id="{{ID}}">
      <label>Project <input name="project" value="{{PROJECT}}" required /></label>
      <div class="time-row">
        <label>Amount <input name="amount" type="number" min="1" value="{{AMOUNT}}" /></label>
        <label>Unit
          <select name="unit" data-value="{{UNIT}}">
            <option value="minutes">minutes</option>
            <option value="hours">hours</option>
          </select>
        </label>
      </div>
      <label>Gains <textarea name="gains">{{GAINS}}</textarea></label>
      <label>Challenges <textarea name="challenges">{{CHALLENGES}}</textarea></label>
      <label>Plan <textarea name="plan">{{PLAN}}</textarea></label>
      <button type="submit">Save changes</button>
      <p id="status" class="status"></p>
    </form>
  </main>
  <script>
    const form = document.getElementById('edit-form');
    const status = document.getElementById('status');
    const unit = form.querySelector('select[name="unit"]');
    unit.value = unit.dataset.value;

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      const data = new FormData(form);
      const payload = {
        project: data.get('project'),
        workTime: { amount: parseInt(data.get('amount') || '0', 10), unit: data.get('unit') },
        gains: data.get('gains'),
        challenges: data.get('challenges'),
        plan: data.get('plan')
      };

      const res = await fetch('/api/logs/' + form.dataset.id, {
        method: 'PUT',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(payload)
      });

      if (res.ok) {
        location.href = '/history';
      } else {
        status.textContent = await res.text() || 'Update failed';
        status.className = 'status error';
      }
    });
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TimeUnit, WorkTime};
    use chrono::{TimeZone, Utc};

    #[test]
    fn format_minutes_handles_all_shapes() {
        assert_eq!(format_minutes(45), "45 min");
        assert_eq!(format_minutes(120), "2 h");
        assert_eq!(format_minutes(135), "2 h 15 min");
    }

    #[test]
    fn history_escapes_user_text() {
        let entry = LogEntry {
            id: "1".into(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap(),
            project: "<script>alert(1)</script>".into(),
            work_time: WorkTime { amount: 30, unit: TimeUnit::Minutes },
            gains: "g".repeat(30),
            challenges: "c".repeat(30),
            plan: "p".repeat(30),
        };
        let page = render_history_page(&[entry], false);
        assert!(!page.contains("<script>alert"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn every_page_carries_the_shared_nav_badge() {
        let entry = LogEntry {
            id: "1".into(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap(),
            project: "Alpha".into(),
            work_time: WorkTime { amount: 30, unit: TimeUnit::Minutes },
            gains: "g".repeat(30),
            challenges: "c".repeat(30),
            plan: "p".repeat(30),
        };
        for page in [
            render_log_page(&[], true, 0),
            render_history_page(&[], true),
            render_stats_page(&[], true),
            render_edit_page(&entry, true),
        ] {
            assert!(page.contains("<span class=\"badge\">cloud</span>"));
            assert!(!page.contains("{{NAV}}"));
        }
        assert!(render_stats_page(&[], false).contains("<span class=\"badge\">anonymous</span>"));
    }

    #[test]
    fn log_page_shows_session_banner_only_when_needed() {
        let page = render_log_page(&[], false, 0);
        assert!(!page.contains("class=\"banner\""));

        let page = render_log_page(&[], false, 2);
        assert!(page.contains("live only in this session"));

        let page = render_log_page(&[], true, 2);
        assert!(page.contains("Save to cloud"));
    }
}

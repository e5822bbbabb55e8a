//! Stylesheet and script embedded into every page. No external assets.

pub const STYLE: &str = r##"
:root {
  --bg: #0e1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #ff4b4b;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app { max-width: 1100px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: baseline;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 24px; font-weight: 600; }
header .api { color: var(--text-muted); font-family: var(--mono); font-size: 12px; }

nav {
  display: flex;
  gap: 4px;
  margin-bottom: 24px;
  background: var(--surface);
  border-radius: var(--radius);
  padding: 4px;
  border: 1px solid var(--border);
}
nav a {
  flex: 1;
  text-align: center;
  padding: 8px 16px;
  border-radius: 6px;
  color: var(--text-muted);
  text-decoration: none;
  font-weight: 500;
}
nav a:hover { color: var(--text); background: rgba(255,255,255,0.04); }
nav a.active { color: var(--text); background: var(--bg); }

.grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); gap: 16px; }
.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 16px;
}
.card h2 { font-size: 15px; margin-bottom: 12px; }
.card p.hint { color: var(--text-muted); font-size: 12px; margin-bottom: 12px; }

label { display: block; color: var(--text-muted); font-size: 12px; margin: 8px 0 4px; }
input[type=text], input[type=url], select, textarea {
  width: 100%;
  padding: 6px 8px;
  background: var(--bg);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: 6px;
  font-family: var(--font);
}
textarea { font-family: var(--mono); min-height: 96px; }
input[type=file] { color: var(--text-muted); }

button {
  margin-top: 12px;
  padding: 6px 14px;
  border: 1px solid var(--border);
  border-radius: 6px;
  background: var(--bg);
  color: var(--text);
  cursor: pointer;
}
button:hover { border-color: var(--accent); }
button.danger { border-color: var(--red); color: var(--red); }
button:disabled { opacity: 0.4; cursor: not-allowed; }
.checkbox { display: flex; gap: 8px; align-items: center; margin-top: 8px; color: var(--text); }

.notice {
  border-left: 4px solid var(--border);
  background: var(--surface);
  border-radius: var(--radius);
  padding: 12px 16px;
  margin-bottom: 16px;
}
.notice.success { border-color: var(--green); }
.notice.warning { border-color: var(--yellow); }
.notice.error { border-color: var(--red); }
.notice .meta { color: var(--text-muted); font-size: 12px; }
.notice pre {
  margin-top: 8px;
  padding: 8px;
  background: var(--bg);
  border-radius: 6px;
  font-family: var(--mono);
  font-size: 12px;
  overflow-x: auto;
}
.notice a.download { display: inline-block; margin-top: 8px; color: var(--accent); }

table { border-collapse: collapse; margin-top: 8px; font-family: var(--mono); font-size: 12px; }
th, td { border: 1px solid var(--border); padding: 4px 8px; text-align: left; }
th { color: var(--text-muted); }

#busy {
  display: none;
  position: fixed;
  inset: 0;
  background: rgba(14,17,23,0.6);
  align-items: center;
  justify-content: center;
  font-size: 16px;
}
body.busy #busy { display: flex; }
"##;

/// Shows the busy overlay while a form submission is in flight.
pub const SCRIPT: &str = r##"
document.addEventListener('submit', function () {
  document.body.classList.add('busy');
});
window.addEventListener('pageshow', function () {
  document.body.classList.remove('busy');
});
"##;

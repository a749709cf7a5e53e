//! HTML page shell and Markdown rendering.
//!
//! The UI is one server-rendered page; all data flows through the JSON API
//! from plain `fetch` calls. Styling is deliberately minimal.

use pulldown_cmark::Parser;

/// Render Markdown to sanitized HTML.
pub fn render_markdown(content: &str) -> String {
    let parser = Parser::new(content);
    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    // Sanitize to prevent XSS from raw HTML in model output
    ammonia::clean(&html_output)
}

// ============================================================================
// Styles
// ============================================================================

const STYLE: &str = r#"
:root {
    --bg: #0a0a0a;
    --panel: #141414;
    --border: #2a2a2a;
    --fg: #e5e5e5;
    --muted: #8a8a8a;
    --accent: #3b82f6;
    --danger: #ef4444;
}

* { box-sizing: border-box; margin: 0; padding: 0; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    background: var(--bg);
    color: var(--fg);
    line-height: 1.6;
}

.layout { display: flex; min-height: 100vh; }

.sidebar {
    width: 240px;
    border-right: 1px solid var(--border);
    padding: 1rem;
    flex-shrink: 0;
}

.sidebar h3 {
    font-size: 0.75rem;
    text-transform: uppercase;
    letter-spacing: 0.05em;
    color: var(--muted);
    margin-bottom: 0.75rem;
    display: flex;
    justify-content: space-between;
}

.sidebar button.clear {
    background: none;
    border: none;
    color: var(--muted);
    cursor: pointer;
    font-size: 0.75rem;
}
.sidebar button.clear:hover { color: var(--danger); }

.history-item {
    display: block;
    width: 100%;
    text-align: left;
    background: var(--panel);
    border: 1px solid transparent;
    border-radius: 8px;
    color: var(--fg);
    padding: 0.5rem 0.75rem;
    margin-bottom: 0.5rem;
    cursor: pointer;
    font-size: 0.85rem;
}
.history-item:hover { border-color: var(--border); }

.main { flex: 1; max-width: 960px; margin: 0 auto; padding: 2rem 1.5rem; }

header h1 { font-size: 1.5rem; margin-bottom: 0.25rem; }
header p { color: var(--muted); font-size: 0.9rem; margin-bottom: 1.5rem; }

.search-form { display: flex; gap: 0.5rem; margin-bottom: 1.5rem; }
.search-form input {
    flex: 1;
    background: var(--panel);
    border: 1px solid var(--border);
    border-radius: 10px;
    color: var(--fg);
    padding: 0.75rem 1rem;
    font-size: 1rem;
}
.search-form button {
    background: var(--accent);
    border: none;
    border-radius: 10px;
    color: white;
    padding: 0.75rem 1.5rem;
    font-size: 1rem;
    cursor: pointer;
}
.search-form button:disabled { opacity: 0.5; cursor: wait; }

#status { color: var(--muted); margin-bottom: 1rem; min-height: 1.5rem; }

.tabs { display: flex; gap: 0.5rem; border-bottom: 1px solid var(--border); margin-bottom: 1rem; }
.tabs button {
    background: none;
    border: none;
    border-bottom: 2px solid transparent;
    color: var(--muted);
    padding: 0.5rem 1rem;
    cursor: pointer;
    font-size: 0.95rem;
}
.tabs button.active { color: var(--fg); border-bottom-color: var(--accent); }

.card {
    background: var(--panel);
    border: 1px solid var(--border);
    border-radius: 12px;
    padding: 1rem;
    margin-bottom: 1rem;
    display: flex;
    gap: 1rem;
}
.card img { width: 200px; border-radius: 8px; align-self: flex-start; }
.card .body { flex: 1; }
.card h3 { font-size: 1rem; margin-bottom: 0.25rem; }
.card h3 a { color: var(--fg); text-decoration: none; }
.card h3 a:hover { color: var(--accent); }
.card .meta { color: var(--muted); font-size: 0.8rem; margin-bottom: 0.5rem; }
.card .badge {
    display: inline-block;
    background: #1d3156;
    color: #93c5fd;
    border-radius: 4px;
    font-size: 0.7rem;
    padding: 0.1rem 0.4rem;
    margin-right: 0.5rem;
}
.card .subtitle { font-weight: 600; margin-bottom: 0.5rem; }
.card ul { padding-left: 1.25rem; font-size: 0.9rem; }
.card button.save {
    background: none;
    border: 1px solid var(--border);
    border-radius: 6px;
    color: var(--muted);
    padding: 0.25rem 0.75rem;
    cursor: pointer;
    font-size: 0.8rem;
    margin-top: 0.5rem;
}
.card button.save.saved { color: var(--accent); border-color: var(--accent); }

#report { background: var(--panel); border: 1px solid var(--border); border-radius: 12px; padding: 1.5rem; }
#report h1, #report h2 { margin: 1rem 0 0.5rem; }
#report ul { padding-left: 1.25rem; }

.empty { color: var(--muted); font-style: italic; padding: 1rem 0; }
"#;

// ============================================================================
// Client Script
// ============================================================================

const APP_JS: &str = r#"
let savedIds = new Set();
let lastVideos = [];

function esc(s) {
    return String(s ?? "").replace(/[&<>"']/g, c => ({
        "&": "&amp;", "<": "&lt;", ">": "&gt;", '"': "&quot;", "'": "&#39;"
    })[c]);
}

function showTab(name) {
    document.querySelectorAll(".tabs button").forEach(b =>
        b.classList.toggle("active", b.dataset.tab === name));
    document.querySelectorAll(".tab-pane").forEach(p =>
        p.style.display = p.id === "tab-" + name ? "block" : "none");
}

async function loadHistory() {
    const res = await fetch("/api/history");
    if (!res.ok) return;
    const topics = await res.json();
    const box = document.getElementById("history");
    box.innerHTML = topics.length === 0
        ? '<p class="empty">No history yet.</p>'
        : topics.map(t =>
            `<button class="history-item" data-topic="${esc(t)}">${esc(t)}</button>`
          ).join("");
}

async function clearHistory() {
    await fetch("/api/history", { method: "DELETE" });
    loadHistory();
}

async function loadSaved() {
    const res = await fetch("/api/saved");
    if (!res.ok) return;
    const videos = await res.json();
    savedIds = new Set(videos.map(v => v.id));
    document.getElementById("tab-saved").innerHTML = videos.length === 0
        ? '<p class="empty">Nothing saved yet.</p>'
        : videos.map(videoCard).join("");
    // Refresh save buttons on the videos tab too
    if (lastVideos.length > 0) {
        document.getElementById("tab-videos").innerHTML = lastVideos.map(videoCard).join("");
    }
}

async function toggleSave(id) {
    if (savedIds.has(id)) {
        await fetch("/api/saved/" + encodeURIComponent(id), { method: "DELETE" });
    } else {
        const video = lastVideos.find(v => v.id === id);
        if (!video) return;
        await fetch("/api/saved", {
            method: "POST",
            headers: { "Content-Type": "application/json" },
            body: JSON.stringify({
                id: video.id, title: video.title, url: video.url,
                duration: video.duration, thumbnail: video.thumbnail,
                channel: video.channel, views: video.views,
                uploaded_at: video.uploaded_at, description: video.description || ""
            }),
        });
    }
    loadSaved();
}

function videoCard(v) {
    const isSaved = savedIds.has(v.id);
    const analysis = v.analysis
        ? `<p class="subtitle">${esc(v.analysis.subtitle)}</p>
           <ul>${v.analysis.summary.map(s => `<li>${esc(s)}</li>`).join("")}</ul>`
        : "";
    const badge = v.reasoning ? `<span class="badge">${esc(v.reasoning)}</span>` : "";
    return `<div class="card">
        <img src="${esc(v.thumbnail)}" alt="" loading="lazy">
        <div class="body">
            <h3><a href="${esc(v.url)}" target="_blank" rel="noopener">${esc(v.title)}</a></h3>
            <p class="meta">${badge}${esc(v.channel)} · ${esc(v.duration)} · ${Number(v.views).toLocaleString()} views</p>
            ${analysis}
            <button class="save ${isSaved ? "saved" : ""}" data-id="${esc(v.id)}">
                ${isSaved ? "Saved" : "Save"}
            </button>
        </div>
    </div>`;
}

async function runResearch(topic) {
    const input = document.getElementById("topic");
    if (topic) input.value = topic;
    topic = input.value.trim();
    if (!topic) return;

    const button = document.getElementById("go");
    const status = document.getElementById("status");
    button.disabled = true;
    status.textContent = "Planning, searching and ranking... this can take a minute.";

    try {
        const res = await fetch("/api/research", {
            method: "POST",
            headers: { "Content-Type": "application/json" },
            body: JSON.stringify({ topic }),
        });
        const data = await res.json();
        if (!res.ok) throw new Error(data.error || "Research failed");

        lastVideos = data.videos;
        document.getElementById("tab-report").innerHTML =
            `<div id="report">${data.report_html}</div>`;
        document.getElementById("tab-videos").innerHTML = data.videos.length === 0
            ? '<p class="empty">No videos survived ranking.</p>'
            : data.videos.map(videoCard).join("");
        showTab("report");
        status.textContent = `Done: ${data.videos.length} videos analyzed.`;
        loadHistory();
    } catch (e) {
        status.textContent = "Research failed: " + e.message;
    } finally {
        button.disabled = false;
    }
}

document.getElementById("search-form").addEventListener("submit", e => {
    e.preventDefault();
    runResearch();
});
document.querySelectorAll(".tabs button").forEach(b =>
    b.addEventListener("click", () => showTab(b.dataset.tab)));
// Cards and history entries are re-rendered constantly, so delegate their clicks
document.addEventListener("click", e => {
    const save = e.target.closest("button.save");
    if (save) { toggleSave(save.dataset.id); return; }
    const item = e.target.closest(".history-item");
    if (item) runResearch(item.dataset.topic);
});

loadHistory();
loadSaved();
showTab("report");
"#;

// ============================================================================
// Page
// ============================================================================

/// The single-page shell.
pub fn page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Scout</title>
<style>{style}</style>
</head>
<body>
<div class="layout">
    <aside class="sidebar">
        <h3>Recent Research <button class="clear" onclick="clearHistory()">clear</button></h3>
        <div id="history"><p class="empty">No history yet.</p></div>
    </aside>
    <main class="main">
        <header>
            <h1>Scout</h1>
            <p>Research assistant: ranked videos and a synthesized report for any topic.</p>
        </header>
        <form class="search-form" id="search-form">
            <input id="topic" placeholder="e.g. Current state of quantum computing" required>
            <button id="go" type="submit">Research</button>
        </form>
        <div id="status"></div>
        <div class="tabs">
            <button data-tab="report" class="active">Report</button>
            <button data-tab="videos">Videos</button>
            <button data-tab="saved">Saved</button>
        </div>
        <div id="tab-report" class="tab-pane"><p class="empty">Run a search to generate a report.</p></div>
        <div id="tab-videos" class="tab-pane"><p class="empty">No results yet.</p></div>
        <div id="tab-saved" class="tab-pane"><p class="empty">Nothing saved yet.</p></div>
    </main>
</div>
<script>{js}</script>
</body>
</html>"#,
        style = STYLE,
        js = APP_JS
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_renders_and_sanitizes() {
        let html = render_markdown("# Title\n\n- point\n\n<script>alert(1)</script>");
        assert!(html.contains("<h1>"));
        assert!(html.contains("<li>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn page_contains_tabs_and_form() {
        let html = page();
        assert!(html.contains("id=\"search-form\""));
        assert!(html.contains("data-tab=\"videos\""));
        assert!(html.contains("data-tab=\"saved\""));
    }
}

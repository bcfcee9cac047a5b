//! Console module - generates the browser page for navigating assets.
//!
//! The page is a single HTML document with inline script. It talks only to
//! the proxy actions under `/api/v1/`, sending the user's bearer token.

use serde::Serialize;

use crate::browse::{DEFAULT_FRAGMENT_MODEL, DEFAULT_PAGE_SIZE, REFRESH_LATENCY_BUFFER};

/// Settings baked into the console page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleSettings {
    /// Instance the console browses (None = entered by the user)
    pub instance: Option<String>,

    /// API prefix on the instance
    pub api: String,

    /// Items requested per page
    pub page_size: u32,

    /// Model used for new content fragments
    pub fragment_model: String,

    /// Delay before reloading after a change, in milliseconds
    pub refresh_delay_ms: u64,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            instance: None,
            api: "api/assets".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            fragment_model: DEFAULT_FRAGMENT_MODEL.to_string(),
            refresh_delay_ms: REFRESH_LATENCY_BUFFER.as_millis() as u64,
        }
    }
}

/// Escape HTML special characters to prevent XSS attacks.
fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Generate the console HTML page.
pub fn generate_console_html(settings: &ConsoleSettings) -> String {
    let config = serde_json::to_string(settings).unwrap_or_else(|_| "{}".to_string());
    let instance_label = settings.instance.as_deref().unwrap_or("not configured");

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Asset Console</title>
    <style>{style}</style>
</head>
<body data-config="{config}">
    <section class="info">
        <h1>Asset Console</h1>
        <p>Navigate the asset tree, create folders and content fragments, edit and delete them.</p>
        <ul>
            <li>Instance: <span id="instance-label">{instance}</span></li>
            <li>Assets API: <code>{api}</code></li>
        </ul>
        <form id="login">
            <input id="instance-input" type="url" placeholder="https://author.example.com/">
            <input id="token-input" type="password" placeholder="Bearer token" autocomplete="off">
            <button type="submit">Connect</button>
        </form>
    </section>
    <div class="console">
        <header>
            <nav id="breadcrumbs" aria-label="Breadcrumbs"></nav>
            <span id="spinner" class="spinner" hidden aria-label="Loading"></span>
            <div class="actions">
                <button id="create-folder">Create a folder</button>
                <button id="create-fragment" class="cta">Create a content fragment</button>
            </div>
        </header>
        <div id="grid" class="grid" role="grid"></div>
    </div>
    <dialog id="editor">
        <form method="dialog">
            <h2>Content Fragment Editor</h2>
            <label>Title <textarea id="editor-title" rows="2"></textarea></label>
            <button type="button" data-translate="editor-title">Translate</button>
            <label>Text <textarea id="editor-text" rows="14"></textarea></label>
            <button type="button" data-translate="editor-text">Translate</button>
            <menu>
                <button value="cancel">Cancel</button>
                <button id="editor-save" value="save" class="cta">Save</button>
            </menu>
        </form>
    </dialog>
    <script>{script}</script>
</body>
</html>
"##,
        style = CONSOLE_STYLE,
        config = html_escape(&config),
        instance = html_escape(instance_label),
        api = html_escape(&settings.api),
        script = CONSOLE_SCRIPT,
    )
}

const CONSOLE_STYLE: &str = r#"
* { box-sizing: border-box; }
body { margin: 0; padding: 0 32px; min-height: 100vh; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; color: #2c2c2c; background: #fafafa; }
.info { padding: 24px 0 8px; }
.info h1 { font-size: 22px; margin: 0 0 8px; }
.console { margin-top: 32px; isolation: isolate; }
.console.is-disabled { pointer-events: none; opacity: 0.6; }
header { display: flex; align-items: center; gap: 16px; margin-bottom: 16px; }
header .actions { margin-left: auto; display: flex; gap: 8px; }
nav a { color: #4b4b4b; cursor: pointer; text-decoration: none; }
nav a:not(:last-child)::after { content: "›"; margin: 0 8px; color: #959595; }
nav a:last-child { font-weight: 600; }
button { border: 2px solid #4b4b4b; background: transparent; border-radius: 16px; padding: 4px 14px; font-weight: 600; cursor: pointer; }
button.cta { background: #1473e6; border-color: #1473e6; color: #fff; }
button.quiet { border: none; padding: 4px 6px; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 24px; }
.card { background: #fff; border-radius: 4px; box-shadow: 0 1px 4px rgba(0,0,0,0.15); cursor: pointer; }
.card .preview { height: 150px; display: flex; align-items: center; justify-content: center; background: #f0f0f0; font-size: 48px; }
.card .preview img { max-width: 100%; max-height: 100%; }
.card .body { padding: 12px; }
.card .title { font-weight: 700; word-break: break-all; }
.card .subtitle { font-size: 12px; color: #6e6e6e; text-transform: uppercase; }
.card .quick { display: flex; justify-content: flex-end; padding: 0 8px 8px; }
.spinner { width: 18px; height: 18px; border: 3px solid #ddd; border-top-color: #1473e6; border-radius: 50%; animation: spin 1s linear infinite; }
@keyframes spin { to { transform: rotate(360deg); } }
dialog { width: min(900px, 95vw); }
dialog label { display: block; margin-top: 12px; font-weight: 600; }
dialog textarea { width: 100%; }
"#;

const CONSOLE_SCRIPT: &str = r#"
(function () {
  const config = JSON.parse(document.body.dataset.config);
  const state = {
    instance: config.instance || sessionStorage.getItem('instance') || '',
    token: sessionStorage.getItem('token') || '',
    path: location.hash ? decodeURIComponent(location.hash.slice(1)) : '',
    items: [],
    total: -1,
    loading: false,
    controllers: [],
  };

  const $ = (id) => document.getElementById(id);
  const text = (v) => Array.isArray(v) ? v.find((x) => typeof x === 'string') : (typeof v === 'string' ? v : undefined);
  const grid = $('grid');
  const consoleEl = document.querySelector('.console');

  if (config.instance) { $('instance-input').hidden = true; }
  $('instance-input').value = state.instance;
  $('token-input').value = state.token;

  function childPath(name) { return state.path === '' ? name : state.path + '/' + name; }
  function slugify(title) { return title.replace(/[^A-Z0-9]/ig, '-'); }

  async function call(action, body, signal) {
    const resp = await fetch('/api/v1/' + action, {
      method: 'POST',
      headers: { 'Content-Type': 'application/json', 'Authorization': 'Bearer ' + state.token },
      body: JSON.stringify(Object.assign({ instance: state.instance, api: config.api }, body)),
      signal: signal,
    });
    return resp;
  }

  function setLoading(loading, disabled) {
    state.loading = loading;
    $('spinner').hidden = !loading;
    consoleEl.classList.toggle('is-disabled', !!disabled);
  }

  function cancelThumbnails() {
    state.controllers.forEach((c) => c.abort());
    state.controllers = [];
  }

  function pathFromHref(href) {
    const base = state.instance.replace(/\/+$/, '') + '/' + config.api.replace(/^\/+|\/+$/g, '');
    let rest = href.split('?')[0];
    if (rest.startsWith(base)) { rest = rest.slice(base.length); }
    return rest.replace(/\.json$/, '').replace(/^\/+|\/+$/g, '');
  }

  function renderBreadcrumbs() {
    const nav = $('breadcrumbs');
    nav.textContent = '';
    const crumbs = [{ name: 'Assets', path: '' }];
    if (state.path.length) {
      const partial = [];
      state.path.split('/').forEach((segment) => {
        partial.push(segment);
        crumbs.push({ name: segment, path: partial.join('/') });
      });
    }
    crumbs.forEach((crumb) => {
      const a = document.createElement('a');
      a.textContent = crumb.name;
      a.addEventListener('click', () => navigate(crumb.path));
      nav.appendChild(a);
    });
  }

  function loadThumbnail(item, preview) {
    const controller = new AbortController();
    state.controllers.push(controller);
    call('thumbnail', { path: childPath(item.properties.name) }, controller.signal)
      .then((res) => res.ok ? res.json() : null)
      .then((body) => {
        if (!body || !body.base64) { return; }
        const img = document.createElement('img');
        img.src = 'data:' + (body.mimeType || 'image/png') + ';base64,' + body.base64;
        preview.textContent = '';
        preview.appendChild(img);
      })
      .catch(() => {});
  }

  function renderCard(item) {
    const isFolder = item['class'] && item['class'][0] === 'assets/folder';
    const card = document.createElement('div');
    card.className = 'card';
    card.setAttribute('role', 'gridcell');

    const preview = document.createElement('div');
    preview.className = 'preview';
    preview.textContent = isFolder ? '\u{1F4C1}' : '\u{1F4C4}';
    card.appendChild(preview);

    const body = document.createElement('div');
    body.className = 'body';
    const title = document.createElement('div');
    title.className = 'title';
    title.textContent = text(item.properties.title) || item.properties.name;
    const subtitle = document.createElement('div');
    subtitle.className = 'subtitle';
    subtitle.textContent = isFolder ? 'folder' : 'file';
    body.append(title, subtitle);
    card.appendChild(body);

    const quick = document.createElement('div');
    quick.className = 'quick';
    const open = button('Open', () => {
      const base = state.instance.replace(/\/+$/, '');
      window.open(base + '/assets.html/content/dam/' + childPath(item.properties.name), '_blank');
    });
    quick.appendChild(open);
    if (item.properties.contentFragment) {
      quick.appendChild(button('Edit', () => openEditor(item)));
    }
    quick.appendChild(button('Delete', () => remove(item)));
    card.appendChild(quick);

    card.addEventListener('click', (e) => {
      if (quick.contains(e.target) || item.properties.contentFragment || !isFolder) { return; }
      const href = item.links && item.links[0] ? item.links[0].href : '';
      navigate(href ? pathFromHref(href) : childPath(item.properties.name));
    });

    loadThumbnail(item, preview);
    return card;
  }

  function button(label, onPress) {
    const b = document.createElement('button');
    b.className = 'quiet';
    b.textContent = label;
    b.addEventListener('click', (e) => { e.stopPropagation(); onPress(); });
    return b;
  }

  function render(items) { items.forEach((item) => grid.appendChild(renderCard(item))); }

  async function navigate(path) {
    cancelThumbnails();
    state.path = path;
    location.hash = path;
    renderBreadcrumbs();
    grid.textContent = '';
    if (!state.token || !state.instance) { return; }

    setLoading(true, true);
    try {
      const res = await call('read', { path: path, limit: config.pageSize });
      const body = res.ok ? await res.json() : {};
      state.items = body.entities || [];
      state.total = body.properties && body.properties['srn:paging'] ? body.properties['srn:paging'].total : -1;
      render(state.items);
    } finally {
      setLoading(false, false);
    }
  }

  async function loadMore() {
    if (state.loading || state.items.length >= state.total) { return; }
    setLoading(true, false);
    try {
      const res = await call('read', { path: state.path, offset: state.items.length, limit: config.pageSize });
      const body = res.ok ? await res.json() : {};
      const more = body.entities || [];
      if (!more.length) { state.total = state.items.length; }
      state.items = state.items.concat(more);
      render(more);
    } finally {
      setLoading(false, false);
    }
  }

  function refresh() { setTimeout(() => navigate(state.path), config.refreshDelayMs); }

  async function create(data, name) {
    if (!name) { return; }
    const res = await call('create', { path: childPath(name), data: data });
    if (res.ok) { refresh(); } else { console.error(res.statusText); }
  }

  async function remove(item) {
    const label = text(item.properties.title) || item.properties.name;
    if (!window.confirm('Are you sure you want to delete ' + label + ' ?')) { return; }
    const res = await call('delete', { path: childPath(item.properties.name) });
    if (res.ok) { refresh(); } else { console.error(res.statusText); }
  }

  function elements(title, text) {
    return { title: { value: title, ':type': 'string' }, text: { value: text, ':type': 'text/html' } };
  }

  function openEditor(item) {
    const dialog = $('editor');
    const el = item.properties.elements || {};
    $('editor-title').value = (el.title && text(el.title.value)) || '';
    $('editor-text').value = (el.text && text(el.text.value)) || '';
    dialog.onclose = async () => {
      if (dialog.returnValue !== 'save') { return; }
      const res = await call('update', {
        path: childPath(item.properties.name),
        data: { properties: { elements: elements($('editor-title').value, $('editor-text').value) } },
      });
      if (res.ok) { refresh(); } else { console.error(res.statusText); }
    };
    dialog.showModal();
  }

  document.querySelectorAll('[data-translate]').forEach((b) => {
    b.addEventListener('click', async () => {
      const field = $(b.dataset.translate);
      const res = await call('translate', { text: field.value });
      if (res.ok) { field.value = await res.text(); }
    });
  });

  $('create-folder').addEventListener('click', () => {
    const title = window.prompt('Folder title');
    if (title) { create({ 'class': 'assetFolder', properties: { title: title } }, slugify(title)); }
  });

  $('create-fragment').addEventListener('click', () => {
    const title = window.prompt('Content fragment title (model ' + config.fragmentModel + ')');
    if (title) {
      create({ properties: { 'cq:model': config.fragmentModel, title: title, elements: elements('', '') } }, slugify(title));
    }
  });

  $('login').addEventListener('submit', (e) => {
    e.preventDefault();
    state.instance = config.instance || $('instance-input').value;
    state.token = $('token-input').value;
    sessionStorage.setItem('instance', state.instance);
    sessionStorage.setItem('token', state.token);
    $('instance-label').textContent = state.instance;
    navigate(state.path);
  });

  window.addEventListener('scroll', () => {
    if (window.innerHeight + document.documentElement.scrollTop + 2 < document.documentElement.offsetHeight) { return; }
    loadMore();
  });

  navigate(state.path);
})();
"#;

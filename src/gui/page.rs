/// The single-page browser front-end
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Chat RAG 2.0</title>
<style>
  * { box-sizing: border-box; }
  body {
    margin: 0;
    min-height: 100vh;
    font-family: system-ui, sans-serif;
    color: #e8eef2;
    background: radial-gradient(#416e8a, #000000);
  }
  h1 { margin: 0; padding: 16px 24px; font-size: 1.6rem; }
  .layout { display: flex; gap: 16px; padding: 0 24px 24px; }
  .chat-column { flex: 7; display: flex; flex-direction: column; gap: 8px; }
  .side-column { flex: 3; display: flex; flex-direction: column; gap: 8px; }
  #chatbot {
    height: 70vh;
    overflow-y: auto;
    padding: 12px;
    border-radius: 8px;
    background: rgba(0, 0, 0, 0.35);
  }
  .bubble { margin: 8px 0; padding: 8px 12px; border-radius: 8px; white-space: pre-wrap; max-width: 90%; }
  .bubble.user { margin-left: auto; background: #06354d; }
  .bubble.assistant { background: rgba(255, 255, 255, 0.1); }
  input[type=text], textarea {
    width: 100%;
    padding: 10px;
    border: none;
    border-radius: 6px;
    color: #e8eef2;
    background: rgba(0, 0, 0, 0.4);
  }
  .row { display: flex; gap: 8px; }
  .row > button { flex: 1; }
  .button {
    padding: 8px 12px;
    border: none;
    border-radius: 6px;
    color: #ffffff;
    cursor: pointer;
    background: #06354d;
  }
  .button:disabled { opacity: 0.5; cursor: wait; }
  .tabs { display: flex; gap: 4px; }
  .tab { padding: 8px; cursor: pointer; border-radius: 6px 6px 0 0; background: rgba(0, 0, 0, 0.3); }
  .tab.active { background: rgba(0, 0, 0, 0.6); }
  .panel { display: none; flex-direction: column; gap: 8px; padding: 12px; border-radius: 0 6px 6px 6px; background: rgba(0, 0, 0, 0.6); }
  .panel.active { display: flex; }
  label { font-size: 0.85rem; }
</style>
</head>
<body>
<h1>Chat RAG 2.0: Interactive Coding Assistant</h1>
<div class="layout">
  <div class="chat-column">
    <div id="chatbot" aria-label="ChatRAG 2.0"></div>
    <input id="msg" type="text" placeholder="Enter your query here and hit enter when you're done...">
    <div class="row">
      <button class="button" id="clear">Clear Chat Window</button>
      <button class="button" id="clear-memory">Clear Chat Window and Chat Memory</button>
    </div>
  </div>
  <div class="side-column">
    <div class="tabs">
      <div class="tab active" data-panel="files-panel">Chat With Files</div>
      <div class="tab" data-panel="github-panel">Chat With a GitHub Repository</div>
    </div>
    <div class="panel active" id="files-panel">
      <input id="files" type="file" multiple
        accept=".txt,.text,.md,.pdf,.xlsx,.py,.dart,.c,.jsx,.xml,.css,.cpp,.html,.docx,.doc,.js,.json,.csv">
      <div class="row">
        <button class="button" id="upload">Upload Data to Knowledge Base</button>
        <button class="button" id="clear-db">Clear Knowledge Base</button>
      </div>
      <label for="upload-status">Upload Status</label>
      <textarea id="upload-status" rows="3" readonly></textarea>
    </div>
    <div class="panel" id="github-panel">
      <label for="owner">GitHub Repository Owners Username:</label>
      <input id="owner" type="text" placeholder="Enter GitHub Repository Owners Username Here....">
      <label for="repo">GitHub Repository Name:</label>
      <input id="repo" type="text" placeholder="Enter Repository Name Here....">
      <label for="branch">GitHub Repository Branch Name:</label>
      <input id="branch" type="text" placeholder="Enter Branch Name Here....">
      <div class="row">
        <button class="button" id="get-repo">Load Repository to Model</button>
        <button class="button" id="remove-repo">Reset Info and Remove Repository from Model</button>
      </div>
      <label for="github-status">GitHub Status</label>
      <textarea id="github-status" rows="3" readonly></textarea>
    </div>
  </div>
</div>
<script>
  const $ = (id) => document.getElementById(id);
  let history = [];

  function render() {
    const chat = $("chatbot");
    chat.innerHTML = "";
    for (const m of history) {
      const div = document.createElement("div");
      div.className = "bubble " + m.role;
      div.textContent = m.content;
      chat.appendChild(div);
    }
    chat.scrollTop = chat.scrollHeight;
  }

  async function post(url, body) {
    const options = { method: "POST" };
    if (body instanceof FormData) {
      options.body = body;
    } else if (body !== undefined) {
      options.headers = { "Content-Type": "application/json" };
      options.body = JSON.stringify(body);
    }
    const response = await fetch(url, options);
    const data = await response.json();
    if (!response.ok) {
      throw new Error(data.error || response.statusText);
    }
    return data;
  }

  async function busy(button, action) {
    button.disabled = true;
    try { await action(); } finally { button.disabled = false; }
  }

  $("msg").addEventListener("keydown", async (event) => {
    if (event.key !== "Enter") return;
    const message = $("msg").value;
    $("msg").value = "";
    $("msg").disabled = true;
    try {
      const data = await post("/api/message", { message, history });
      history = data.history;
      render();
    } catch (err) {
      history.push({ role: "assistant", content: "Error: " + err.message });
      render();
    } finally {
      $("msg").disabled = false;
      $("msg").focus();
    }
  });

  $("clear").addEventListener("click", () => {
    history = [];
    $("msg").value = "";
    render();
  });

  $("clear-memory").addEventListener("click", () => busy($("clear-memory"), async () => {
    const data = await post("/api/memory/clear");
    history = data.history;
    $("msg").value = data.message;
    render();
  }));

  $("upload").addEventListener("click", () => busy($("upload"), async () => {
    const form = new FormData();
    for (const file of $("files").files) form.append("files", file, file.name);
    try {
      $("upload-status").value = (await post("/api/files", form)).status;
    } catch (err) {
      $("upload-status").value = "Error: " + err.message;
    }
  }));

  $("clear-db").addEventListener("click", () => busy($("clear-db"), async () => {
    $("upload-status").value = (await post("/api/knowledge-base/clear")).status;
  }));

  $("get-repo").addEventListener("click", () => busy($("get-repo"), async () => {
    $("github-status").value = "Loading repository...";
    const form = { owner: $("owner").value, repo: $("repo").value, branch: $("branch").value };
    $("github-status").value = (await post("/api/github", form)).status;
  }));

  $("remove-repo").addEventListener("click", () => busy($("remove-repo"), async () => {
    const data = await post("/api/github/reset");
    $("owner").value = data.owner;
    $("repo").value = data.repo;
    $("branch").value = data.branch;
    $("github-status").value = data.status;
  }));

  for (const tab of document.querySelectorAll(".tab")) {
    tab.addEventListener("click", () => {
      document.querySelectorAll(".tab").forEach((t) => t.classList.toggle("active", t === tab));
      document.querySelectorAll(".panel").forEach((p) => p.classList.toggle("active", p.id === tab.dataset.panel));
    });
  }
</script>
</body>
</html>
"##;

//! Browser UI served at `/`
//!
//! The page derives its API base from its own path, so the service can be
//! mounted under any prefix.

use axum::response::Html;

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>NoteX</title>
  <style>
    body {
      font-family: Arial, sans-serif;
      max-width: 800px;
      margin: 20px auto;
      padding: 0 10px;
      background: #f5f5f5;
    }
    h1 { text-align: center; }
    form {
      background: #fff;
      padding: 15px;
      border-radius: 8px;
      box-shadow: 0 2px 4px rgba(0,0,0,0.1);
      margin-bottom: 20px;
    }
    input, textarea, button {
      width: 100%;
      margin-bottom: 10px;
      padding: 8px;
      box-sizing: border-box;
    }
    button { cursor: pointer; }
    .note {
      background: #fff;
      margin-bottom: 10px;
      padding: 10px;
      border-radius: 6px;
      box-shadow: 0 1px 3px rgba(0,0,0,0.1);
    }
    .note-title { font-weight: bold; }
    .note-date { font-size: 0.8rem; color: #666; }
  </style>
</head>
<body>
  <h1>NoteX</h1>

  <form id="note-form">
    <input id="title" placeholder="Title" maxlength="255" required />
    <textarea id="description" placeholder="Description" required></textarea>
    <button type="submit">Create note</button>
  </form>

  <h2>Notes</h2>
  <div id="notes-container">Loading notes...</div>

  <script>
    const API_BASE = window.location.pathname.replace(/\/$/, "");

    function renderNote(note) {
      const div = document.createElement("div");
      div.className = "note";

      const title = document.createElement("div");
      title.className = "note-title";
      title.textContent = note.title;

      const description = document.createElement("div");
      description.textContent = note.description;

      const date = document.createElement("div");
      date.className = "note-date";
      date.textContent = "Created: " + new Date(note.created_at).toLocaleString();

      div.append(title, description, date);
      return div;
    }

    async function loadNotes() {
      const container = document.getElementById("notes-container");
      container.textContent = "Loading notes...";
      try {
        const res = await fetch(API_BASE + "/notes");
        const data = await res.json();

        if (!Array.isArray(data)) {
          container.textContent = "Error loading notes.";
          console.error("Unexpected response:", data);
          return;
        }

        if (data.length === 0) {
          container.textContent = "No notes yet.";
          return;
        }

        container.replaceChildren(...data.map(renderNote));
      } catch (err) {
        console.error(err);
        container.textContent = "Error loading notes (see console).";
      }
    }

    async function createNote(event) {
      event.preventDefault();
      const title = document.getElementById("title").value.trim();
      const description = document.getElementById("description").value.trim();
      if (!title || !description) return;

      try {
        const res = await fetch(API_BASE + "/notes", {
          method: "POST",
          headers: { "Content-Type": "application/json" },
          body: JSON.stringify({ title, description })
        });
        const data = await res.json();
        if (!res.ok) {
          throw new Error(data.error || ("HTTP " + res.status));
        }
        console.log("Note created:", data);
        document.getElementById("title").value = "";
        document.getElementById("description").value = "";
        await loadNotes();
      } catch (err) {
        console.error("Error creating note:", err);
        alert("Error creating note (see console).");
      }
    }

    document.getElementById("note-form").addEventListener("submit", createNote);
    loadNotes();
  </script>
</body>
</html>
"#;

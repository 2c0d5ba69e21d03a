//! Modal text form for adding and editing tasks.
//!
//! Typing is captured from logical key events while the form is open; Enter
//! commits, Escape cancels, N opens a blank add form when nothing is open.

use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::prelude::*;

use crate::store::{TaskId, TaskPatch, TaskStore};

const TITLE_LIMIT: usize = 80;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(TaskId),
}

#[derive(Resource, Default)]
pub struct InputForm {
    mode: Option<FormMode>,
    text: String,
}

impl InputForm {
    pub fn open(&mut self, mode: FormMode, text: String) {
        self.mode = Some(mode);
        self.text = text;
    }

    pub fn is_open(&self) -> bool {
        self.mode.is_some()
    }
}

#[derive(Component)]
pub struct FormRoot;

#[derive(Component)]
pub struct FormText;

/// N opens a blank add form while nothing else is capturing the keyboard.
pub fn open_form_on_key(keys: Res<ButtonInput<KeyCode>>, mut form: ResMut<InputForm>) {
    if form.is_open() {
        return;
    }
    if keys.just_pressed(KeyCode::KeyN) {
        form.open(FormMode::Add, String::new());
    }
}

/// Feed logical key events into the form buffer and commit or cancel it.
pub fn capture_form_input(
    mut events: EventReader<KeyboardInput>,
    mut form: ResMut<InputForm>,
    mut store: ResMut<TaskStore>,
) {
    if !form.is_open() {
        events.clear();
        return;
    }
    for event in events.read() {
        if !event.state.is_pressed() {
            continue;
        }
        match &event.logical_key {
            Key::Character(text) => {
                if form.text.chars().count() < TITLE_LIMIT {
                    form.text.push_str(text.as_str());
                }
            }
            Key::Space => {
                if !form.text.is_empty() && form.text.chars().count() < TITLE_LIMIT {
                    form.text.push(' ');
                }
            }
            Key::Backspace => {
                form.text.pop();
            }
            Key::Enter => {
                commit(&mut form, &mut store);
            }
            Key::Escape => {
                form.mode = None;
                form.text.clear();
            }
            _ => {}
        }
    }
}

fn commit(form: &mut InputForm, store: &mut TaskStore) {
    let Some(mode) = form.mode else {
        return;
    };
    let title = form.text.trim().to_string();
    let result = match mode {
        FormMode::Add => store.add(&title, "").map(|_| ()),
        FormMode::Edit(id) => store
            .edit(
                id,
                TaskPatch {
                    title: Some(title),
                    description: None,
                },
            )
            .map(|_| ()),
    };
    match result {
        Ok(()) => {
            form.mode = None;
            form.text.clear();
        }
        // Keep the form open so the user can fix the input.
        Err(e) => warn!("form rejected: {e}"),
    }
}

/// Keep the modal node tree in step with the form resource.
pub fn sync_form_ui(
    mut commands: Commands,
    form: Res<InputForm>,
    roots: Query<Entity, With<FormRoot>>,
    mut texts: Query<&mut Text, With<FormText>>,
) {
    if !form.is_changed() {
        return;
    }

    if !form.is_open() {
        for root in &roots {
            commands.entity(root).despawn();
        }
        return;
    }

    let display = if form.text.is_empty() {
        "_".to_string()
    } else {
        format!("{}_", form.text)
    };

    if roots.is_empty() {
        spawn_form(&mut commands, form.mode == Some(FormMode::Add), &display);
    } else if let Ok(mut text) = texts.single_mut() {
        *text = Text::new(display);
    }
}

fn spawn_form(commands: &mut Commands, adding: bool, display: &str) {
    commands
        .spawn((
            FormRoot,
            Name::new("TaskForm"),
            BackgroundColor(Color::srgba(0.07, 0.08, 0.13, 0.95)),
            Node {
                position_type: PositionType::Absolute,
                left: Val::Percent(30.0),
                top: Val::Percent(40.0),
                width: Val::Percent(40.0),
                display: Display::Flex,
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(10.0),
                padding: UiRect::all(Val::Px(16.0)),
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            BorderColor(Color::srgba(0.4, 0.5, 0.9, 0.5)),
        ))
        .with_children(|panel| {
            panel.spawn((
                Text::new(if adding { "New task" } else { "Edit task" }),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.92, 1.0)),
            ));
            panel.spawn((
                FormText,
                Text::new(display),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.7, 0.85, 1.0)),
            ));
            panel.spawn((
                Text::new("Enter to save, Escape to cancel"),
                TextFont {
                    font_size: 12.0,
                    ..default()
                },
                TextColor(Color::srgba(0.6, 0.65, 0.8, 0.8)),
            ));
        });
}

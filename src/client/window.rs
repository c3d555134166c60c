use super::frame::{FpsCounter, FramePacer};

pub struct ClientWindow {
    window: winit::window::Window,
    title: &'static str,
}

pub struct ClientState {
    main: bool,
    quit: bool,

    pacer: FramePacer,
    fps: FpsCounter,
    time: std::time::Instant,
    frame_elapsed: std::time::Duration,

    mouse_rel: uv::Vec2,
    input_mode: InputMode,

    key_held: [bool; 255],
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum InputMode {
    Camera,
    Mouse,
}

impl ClientWindow {
    pub fn new(
        event_loop: &winit::event_loop::EventLoop<()>,
        (width, height): (u32, u32),
        title: &'static str,
    ) -> Self {
        let window = winit::window::WindowBuilder::new()
            .with_inner_size(winit::dpi::LogicalSize::new(width, height))
            .with_title(title)
            .build(event_loop)
            .expect("failed to create window");

        Self { window, title }
    }

    pub fn window(&self) -> &winit::window::Window {
        &self.window
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.window.inner_size()
    }

    pub fn center(&self) -> winit::dpi::PhysicalPosition<u32> {
        let size = self.window.inner_size();
        winit::dpi::PhysicalPosition::new(size.width / 2, size.height / 2)
    }

    pub fn show_fps(&self, fps: u32) {
        self.window.set_title(&format!("{} - {} FPS", self.title, fps))
    }

    fn set_input_mode(&mut self, input_mode: InputMode) {
        let grab = input_mode == InputMode::Camera;
        if !grab {
            if let Err(err) = self.window.set_cursor_position(self.center()) {
                log::debug!("could not recenter cursor: {}", err)
            }
        }
        self.window.set_cursor_visible(!grab);
        if let Err(err) = self.window.set_cursor_grab(grab) {
            log::warn!("could not change cursor grab: {}", err)
        }
    }

    /// Drives the event loop, calling `frame_handler` at most `target_fps` times a second
    /// and once more when the window is closing.
    pub fn run<Fn: 'static + FnMut(&Self, &ClientState)>(
        mut self,
        event_loop: winit::event_loop::EventLoop<()>,
        target_fps: u32,
        mut frame_handler: Fn,
    ) -> ! {
        let mut state = ClientState::new(&mut self, target_fps);
        event_loop.run(move |event, _, control_flow| {
            state.handle_event(&mut self, event);
            if state.main() {
                frame_handler(&self, &state);
                state.reset()
            }
            *control_flow = if state.quit() {
                winit::event_loop::ControlFlow::Exit
            } else {
                winit::event_loop::ControlFlow::WaitUntil(state.pacer.next_frame())
            }
        })
    }
}

impl ClientState {
    fn new(window: &mut ClientWindow, target_fps: u32) -> Self {
        let now = std::time::Instant::now();
        let input_mode = InputMode::Camera;
        window.set_input_mode(input_mode);
        Self {
            main: false,
            quit: false,
            pacer: FramePacer::new(target_fps, now),
            fps: FpsCounter::new(now),
            time: now,
            frame_elapsed: Default::default(),
            mouse_rel: uv::Vec2::zero(),
            input_mode,
            key_held: [false; 255],
        }
    }

    fn handle_event(&mut self, window: &mut ClientWindow, event: winit::event::Event<()>) {
        match event {
            winit::event::Event::MainEventsCleared => {
                let now = std::time::Instant::now();
                if self.pacer.tick(now) {
                    self.frame_elapsed = now - self.time;
                    self.time = now;
                    if let Some(fps) = self.fps.frame(now) {
                        log::debug!("{} fps", fps);
                        window.show_fps(fps)
                    }
                    self.main = true
                }
            }
            winit::event::Event::LoopDestroyed => self.quit = true,
            winit::event::Event::WindowEvent { event, .. } => match event {
                winit::event::WindowEvent::Destroyed
                | winit::event::WindowEvent::CloseRequested => self.quit = true,
                winit::event::WindowEvent::KeyboardInput { input, .. } => {
                    if let Some(keycode) = input.virtual_keycode {
                        if keycode == winit::event::VirtualKeyCode::Escape
                            && self.input_mode == InputMode::Camera
                        {
                            self.set_input_mode(window, InputMode::Mouse)
                        }
                        self.key_held[keycode as usize] =
                            input.state == winit::event::ElementState::Pressed
                    }
                }
                winit::event::WindowEvent::MouseInput { state, button, .. } => {
                    if button == winit::event::MouseButton::Left
                        && state == winit::event::ElementState::Pressed
                        && self.input_mode == InputMode::Mouse
                    {
                        self.set_input_mode(window, InputMode::Camera)
                    }
                }
                _ => (),
            },
            winit::event::Event::DeviceEvent { event, .. } => {
                if let winit::event::DeviceEvent::MouseMotion { delta } = event {
                    if self.input_mode == InputMode::Camera {
                        // several motion events can arrive between frames
                        self.mouse_rel.x += delta.0 as f32;
                        self.mouse_rel.y += delta.1 as f32
                    }
                }
            }
            _ => (),
        }
    }

    /// (forward, right, up) from the held keys, each in -1..=1.
    pub fn move_vec(&self, move_keys: &[winit::event::VirtualKeyCode; 6]) -> uv::Vec3 {
        match self.input_mode {
            InputMode::Camera => uv::Vec3::new(
                (self.key_held(move_keys[0]) as i32 - self.key_held(move_keys[1]) as i32) as f32,
                (self.key_held(move_keys[2]) as i32 - self.key_held(move_keys[3]) as i32) as f32,
                (self.key_held(move_keys[4]) as i32 - self.key_held(move_keys[5]) as i32) as f32,
            ),
            InputMode::Mouse => uv::Vec3::zero(),
        }
    }

    fn set_input_mode(&mut self, window: &mut ClientWindow, input_mode: InputMode) {
        self.input_mode = input_mode;
        window.set_input_mode(input_mode)
    }

    fn reset(&mut self) {
        self.main = false;
        self.mouse_rel = uv::Vec2::zero()
    }

    fn main(&self) -> bool {
        self.main || self.quit
    }

    pub fn quit(&self) -> bool {
        self.quit
    }

    pub fn frame_elapsed(&self) -> std::time::Duration {
        self.frame_elapsed
    }

    pub fn mouse_rel(&self) -> uv::Vec2 {
        self.mouse_rel
    }

    pub fn key_held(&self, key: winit::event::VirtualKeyCode) -> bool {
        self.key_held[key as usize]
    }
}

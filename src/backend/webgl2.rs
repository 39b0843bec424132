use web_sys::{
    wasm_bindgen::JsCast, HtmlCanvasElement, Performance, WebGl2RenderingContext as Gl,
    WebGlProgram, WebGlShader, WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::{
    backend::{
        elements::{create_canvas_in_element, get_element_by_id_or_body, get_window},
        Layer, Surface, SurfaceKind,
    },
    error::Error,
    scene::{Command, Scene, Viewport},
    sim::ShaderUniformSet,
};

/// Vertex stage shared by every program: one triangle covering the viewport.
pub const VERTEX_SHADER: &str = include_str!("../shaders/fullscreen.vert");

/// Options for the [`WebGl2Surface`].
#[derive(Debug, Clone)]
pub struct WebGl2SurfaceOptions {
    /// Complete fragment shader source.
    fragment_shader: &'static str,
    /// The element ID.
    parent_id: Option<String>,
    /// Stacking order.
    z_index: i32,
    /// Measure performance using the `performance` API.
    measure_performance: bool,
}

impl WebGl2SurfaceOptions {
    /// Constructs a new [`WebGl2SurfaceOptions`] for the given fragment shader.
    pub fn new(fragment_shader: &'static str) -> Self {
        Self {
            fragment_shader,
            parent_id: None,
            z_index: Layer::Background.z_index(),
            measure_performance: false,
        }
    }

    /// Sets the element id of the canvas' parent element.
    pub fn parent_id(mut self, id: &str) -> Self {
        self.parent_id = Some(id.to_string());
        self
    }

    /// Sets the CSS `z-index` of the canvas.
    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Enables or disables frame timing marks.
    pub fn measure_performance(mut self, measure: bool) -> Self {
        self.measure_performance = measure;
        self
    }
}

/// Uniform locations of a program. Any of them may be optimized out.
#[derive(Debug)]
struct Uniforms {
    time: Option<WebGlUniformLocation>,
    resolution: Option<WebGlUniformLocation>,
    pointer: Option<WebGlUniformLocation>,
    intensity: Option<WebGlUniformLocation>,
}

impl Uniforms {
    fn locate(gl: &Gl, program: &WebGlProgram) -> Self {
        Self {
            time: gl.get_uniform_location(program, "u_time"),
            resolution: gl.get_uniform_location(program, "u_resolution"),
            pointer: gl.get_uniform_location(program, "u_pointer"),
            intensity: gl.get_uniform_location(program, "u_intensity"),
        }
    }

    fn upload(&self, gl: &Gl, set: &ShaderUniformSet) {
        gl.uniform1f(self.time.as_ref(), set.time);
        gl.uniform2f(self.resolution.as_ref(), set.resolution.x, set.resolution.y);
        gl.uniform2f(self.pointer.as_ref(), set.pointer.x, set.pointer.y);
        gl.uniform1f(self.intensity.as_ref(), set.intensity);
    }
}

/// WebGL2 surface.
///
/// Draws a single fullscreen triangle with the configured fragment shader
/// each time the scene carries a [`Command::Shader`].
#[derive(Debug)]
pub struct WebGl2Surface {
    canvas: HtmlCanvasElement,
    gl: Gl,
    program: WebGlProgram,
    vao: Option<WebGlVertexArrayObject>,
    uniforms: Uniforms,
    viewport: Viewport,
    performance: Option<Performance>,
}

impl WebGl2Surface {
    /// Constructs a new [`WebGl2Surface`] with the given options.
    pub fn new_with_options(viewport: Viewport, options: WebGl2SurfaceOptions) -> Result<Self, Error> {
        let parent = get_element_by_id_or_body(options.parent_id.as_deref())?;
        let canvas = create_canvas_in_element(&parent, viewport, options.z_index)?;

        match Self::with_canvas(&canvas, options.fragment_shader) {
            Ok((gl, program, vao, uniforms)) => {
                let performance = if options.measure_performance {
                    get_window()?.performance()
                } else {
                    None
                };
                Ok(Self {
                    canvas,
                    gl,
                    program,
                    vao,
                    uniforms,
                    viewport,
                    performance,
                })
            }
            Err(error) => {
                canvas.remove();
                Err(error)
            }
        }
    }

    #[allow(clippy::type_complexity)]
    fn with_canvas(
        canvas: &HtmlCanvasElement,
        fragment_shader: &str,
    ) -> Result<(Gl, WebGlProgram, Option<WebGlVertexArrayObject>, Uniforms), Error> {
        let gl = canvas
            .get_context("webgl2")?
            .ok_or(Error::UnableToRetrieveContext("webgl2"))?
            .dyn_into::<Gl>()
            .map_err(|_| Error::UnableToRetrieveContext("webgl2"))?;

        let vertex = compile_shader(&gl, Gl::VERTEX_SHADER, VERTEX_SHADER)?;
        let fragment = compile_shader(&gl, Gl::FRAGMENT_SHADER, fragment_shader)?;
        let program = link_program(&gl, &vertex, &fragment)?;
        gl.delete_shader(Some(&vertex));
        gl.delete_shader(Some(&fragment));

        let uniforms = Uniforms::locate(&gl, &program);
        let vao = gl.create_vertex_array();
        Ok((gl, program, vao, uniforms))
    }

    /// Returns the canvas element.
    pub fn element(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn draw(&self, set: &ShaderUniformSet) {
        self.measure_begin("shader-frame");
        let gl = &self.gl;
        gl.viewport(0, 0, self.viewport.width as i32, self.viewport.height as i32);
        gl.use_program(Some(&self.program));
        gl.bind_vertex_array(self.vao.as_ref());
        self.uniforms.upload(gl, set);
        gl.draw_arrays(Gl::TRIANGLES, 0, 3);
        gl.bind_vertex_array(None);
        self.measure_end("shader-frame");
    }

    /// Measures the beginning of a performance mark.
    fn measure_begin(&self, label: &str) {
        if let Some(performance) = &self.performance {
            performance.mark(label).unwrap_or_default();
        }
    }

    /// Measures the end of a performance mark.
    fn measure_end(&self, label: &str) {
        if let Some(performance) = &self.performance {
            performance
                .measure_with_start_mark(label, label)
                .unwrap_or_default();
        }
    }
}

impl Surface for WebGl2Surface {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::WebGl2
    }

    fn resize(&mut self, viewport: Viewport) -> Result<(), Error> {
        self.viewport = viewport;
        self.canvas.set_width(viewport.width);
        self.canvas.set_height(viewport.height);
        Ok(())
    }

    fn present(&mut self, scene: &Scene) -> Result<(), Error> {
        for command in scene.commands() {
            match command {
                Command::Shader(set) => self.draw(set),
                Command::Fill { color, .. } => {
                    let [r, g, b] = color.to_vec3();
                    self.gl.clear_color(r, g, b, color.a);
                    self.gl.clear(Gl::COLOR_BUFFER_BIT);
                }
                Command::Clear => {
                    self.gl.clear_color(0.0, 0.0, 0.0, 0.0);
                    self.gl.clear(Gl::COLOR_BUFFER_BIT);
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl Drop for WebGl2Surface {
    fn drop(&mut self) {
        self.gl.delete_vertex_array(self.vao.as_ref());
        self.gl.delete_program(Some(&self.program));
        self.canvas.remove();
    }
}

fn compile_shader(gl: &Gl, kind: u32, source: &str) -> Result<WebGlShader, Error> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| Error::Shader("unable to create shader object".into()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(Error::Shader(log))
    }
}

fn link_program(gl: &Gl, vertex: &WebGlShader, fragment: &WebGlShader) -> Result<WebGlProgram, Error> {
    let program = gl
        .create_program()
        .ok_or_else(|| Error::Shader("unable to create program object".into()))?;
    gl.attach_shader(&program, vertex);
    gl.attach_shader(&program, fragment);
    gl.link_program(&program);

    if gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(Error::Shader(log))
    }
}

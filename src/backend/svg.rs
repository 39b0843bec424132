use web_sys::{wasm_bindgen::JsCast, Element, HtmlElement};

use crate::{
    backend::{
        elements::{get_document, get_element_by_id_or_body, SVG_NS},
        Surface, SurfaceKind,
    },
    error::Error,
    scene::{Command, Scene, Viewport},
};

/// Id of the filter element; the page content references it with
/// `filter: url(#vitrine-warp)`.
pub const FILTER_ID: &str = "vitrine-warp";

/// SVG displacement filter over the page content.
///
/// Builds a zero-sized `<svg>` holding an `feTurbulence` noise source
/// feeding an `feDisplacementMap`, and applies it to the target element.
/// Only the displacement attributes change per frame.
#[derive(Debug)]
pub struct SvgFilterSurface {
    svg: Element,
    turbulence: Element,
    displacement: Element,
    target: HtmlElement,
    scale: Option<f32>,
    base_frequency: Option<f32>,
}

impl SvgFilterSurface {
    /// Constructs the filter and applies it to the element with id
    /// `target_id`, or to `<body>`.
    pub fn new(target_id: Option<&str>) -> Result<Self, Error> {
        let document = get_document()?;
        let create = |name: &str| document.create_element_ns(Some(SVG_NS), name);

        let svg = create("svg")?;
        svg.set_attribute("width", "0")?;
        svg.set_attribute("height", "0")?;
        svg.set_attribute(
            "style",
            "position: fixed; width: 0; height: 0; overflow: hidden; pointer-events: none;",
        )?;

        let defs = create("defs")?;
        let filter = create("filter")?;
        filter.set_attribute("id", FILTER_ID)?;

        let turbulence = create("feTurbulence")?;
        for (name, value) in [
            ("type", "fractalNoise"),
            ("baseFrequency", "0.015 0.015"),
            ("numOctaves", "1"),
            ("result", "noise"),
        ] {
            turbulence.set_attribute(name, value)?;
        }

        let displacement = create("feDisplacementMap")?;
        for (name, value) in [
            ("in", "SourceGraphic"),
            ("in2", "noise"),
            ("scale", "0"),
            ("xChannelSelector", "R"),
            ("yChannelSelector", "G"),
        ] {
            displacement.set_attribute(name, value)?;
        }

        filter.append_child(&turbulence)?;
        filter.append_child(&displacement)?;
        defs.append_child(&filter)?;
        svg.append_child(&defs)?;

        let body = document.body().ok_or(Error::UnableToRetrieveBody)?;
        body.append_child(&svg)?;

        let target = match get_element_by_id_or_body(target_id)
            .and_then(|element| element.dyn_into::<HtmlElement>().map_err(|_| Error::UnableToRetrieveBody))
        {
            Ok(target) => target,
            Err(error) => {
                svg.remove();
                return Err(error);
            }
        };
        if let Err(error) = target
            .style()
            .set_property("filter", &format!("url(#{FILTER_ID})"))
        {
            svg.remove();
            return Err(error.into());
        }

        Ok(Self {
            svg,
            turbulence,
            displacement,
            target,
            scale: None,
            base_frequency: None,
        })
    }

    fn apply(&mut self, scale: f32, base_frequency: f32) -> Result<(), Error> {
        if self.scale != Some(scale) {
            self.displacement.set_attribute("scale", &scale.to_string())?;
            self.scale = Some(scale);
        }
        // Any write to baseFrequency regenerates the noise.
        if self.base_frequency != Some(base_frequency) {
            self.turbulence
                .set_attribute("baseFrequency", &format!("{base_frequency} {base_frequency}"))?;
            self.base_frequency = Some(base_frequency);
        }
        Ok(())
    }
}

impl Surface for SvgFilterSurface {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::SvgFilter
    }

    fn resize(&mut self, _viewport: Viewport) -> Result<(), Error> {
        Ok(())
    }

    fn present(&mut self, scene: &Scene) -> Result<(), Error> {
        for command in scene.commands() {
            if let Command::Displacement {
                scale,
                base_frequency,
            } = command
            {
                self.apply(*scale, *base_frequency)?;
            }
        }
        Ok(())
    }
}

impl Drop for SvgFilterSurface {
    fn drop(&mut self) {
        let _ = self.target.style().remove_property("filter");
        self.svg.remove();
    }
}

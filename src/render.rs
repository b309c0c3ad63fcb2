//! Minimal 2D canvas view: cube wireframe, rotation handles, markers and the
//! hover crosshair, projected through the same camera the pointer rays use.

use crate::events::WebInstrument;
use cube_core::{Camera, LocalPoint};
use glam::Vec3;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

const EDGE_STYLE: &str = "rgba(120, 170, 230, 0.65)";
const HANDLE_STYLE: &str = "rgba(230, 200, 120, 0.9)";
const MARKER_STYLE: &str = "rgba(255, 120, 90, 0.95)";
const HOVER_STYLE: &str = "rgba(200, 230, 255, 0.8)";

// Corner index bits: x = 1, y = 2, z = 4.
const CUBE_EDGES: [(usize, usize); 12] = [
    (0, 1), (2, 3), (4, 5), (6, 7),
    (0, 2), (1, 3), (4, 6), (5, 7),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

pub struct Painter {
    ctx: web::CanvasRenderingContext2d,
}

impl Painter {
    pub fn new(canvas: &web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| anyhow::anyhow!("{e:?}"))?
            .ok_or_else(|| anyhow::anyhow!("2d context unavailable"))?
            .dyn_into::<web::CanvasRenderingContext2d>()
            .map_err(|e| anyhow::anyhow!("{e:?}"))?;
        Ok(Self { ctx })
    }

    #[allow(deprecated)]
    fn stroke_style(&self, style: &str) {
        self.ctx.set_stroke_style(&JsValue::from_str(style));
    }

    #[allow(deprecated)]
    fn fill_style(&self, style: &str) {
        self.ctx.set_fill_style(&JsValue::from_str(style));
    }

    fn dot(&self, at: [f32; 2], radius: f64) {
        self.ctx.begin_path();
        _ = self
            .ctx
            .arc(at[0] as f64, at[1] as f64, radius, 0.0, std::f64::consts::TAU);
        self.ctx.fill();
    }

    pub fn draw(
        &self,
        inst: &WebInstrument,
        camera: &Camera,
        hover: Option<LocalPoint>,
        size: [f32; 2],
    ) {
        let [w, h] = size;
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
        let volume = inst.volume();
        let half = volume.half_size();
        let project = |local: Vec3| camera.project(volume.local_to_world(local), w, h);

        let corners: Vec<Option<[f32; 2]>> = (0..8)
            .map(|i| {
                let sign = |bit: usize| if i & bit != 0 { half } else { -half };
                project(Vec3::new(sign(1), sign(2), sign(4)))
            })
            .collect();
        self.stroke_style(EDGE_STYLE);
        self.ctx.set_line_width(1.5);
        self.ctx.begin_path();
        for (a, b) in CUBE_EDGES {
            if let (Some(pa), Some(pb)) = (corners[a], corners[b]) {
                self.ctx.move_to(pa[0] as f64, pa[1] as f64);
                self.ctx.line_to(pb[0] as f64, pb[1] as f64);
            }
        }
        self.ctx.stroke();

        self.fill_style(HANDLE_STYLE);
        for (_, world) in inst.layout().handle_positions(volume) {
            if let Some(p) = camera.project(world, w, h) {
                self.dot(p, 7.0);
            }
        }

        self.fill_style(MARKER_STYLE);
        for m in inst.markers().iter().filter(|m| m.visible) {
            if let Some(p) = project(m.position) {
                self.dot(p, 9.0);
            }
        }

        if let Some(p) = hover.and_then(project) {
            self.stroke_style(HOVER_STYLE);
            self.ctx.begin_path();
            self.ctx.move_to(p[0] as f64 - 8.0, p[1] as f64);
            self.ctx.line_to(p[0] as f64 + 8.0, p[1] as f64);
            self.ctx.move_to(p[0] as f64, p[1] as f64 - 8.0);
            self.ctx.line_to(p[0] as f64, p[1] as f64 + 8.0);
            self.ctx.stroke();
        }
    }
}

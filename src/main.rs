//! RPS Gauntlet entry point
//!
//! Browser: wires the DOM screens and the confetti canvas to a `Session`.
//! Native: a console version of the same game, for demos and debugging.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlButtonElement, HtmlCanvasElement, HtmlInputElement};

    use rps_gauntlet::fx::{FxCanvas, FxEngine};
    use rps_gauntlet::game::{Hand, Outcome, RoundResult};
    use rps_gauntlet::persistence::LocalStorage;
    use rps_gauntlet::{Session, Tier, format_count};

    const SCREENS: [&str; 4] = ["screen-setup", "screen-game", "screen-result", "screen-victory"];

    /// Canvas 2D context behind the overlay
    struct Canvas2d {
        ctx: CanvasRenderingContext2d,
    }

    impl FxCanvas for Canvas2d {
        fn clear(&mut self, width: f32, height: f32) {
            self.ctx.clear_rect(0.0, 0.0, width as f64, height as f64);
        }

        fn fill_rotated_rect(&mut self, pos: Vec2, rot: f32, rect: [f32; 4], color: &str) {
            self.ctx.save();
            let _ = self.ctx.translate(pos.x as f64, pos.y as f64);
            let _ = self.ctx.rotate(rot as f64);
            self.ctx.set_fill_style_str(color);
            self.ctx
                .fill_rect(rect[0] as f64, rect[1] as f64, rect[2] as f64, rect[3] as f64);
            self.ctx.restore();
        }

        fn stroke_circle(&mut self, center: Vec2, radius: f32, line_width: f32, color: &str) {
            self.ctx.set_line_width(line_width as f64);
            self.ctx.begin_path();
            self.ctx.set_stroke_style_str(color);
            let _ = self.ctx.arc(
                center.x as f64,
                center.y as f64,
                radius.max(0.0) as f64,
                0.0,
                std::f64::consts::TAU,
            );
            self.ctx.stroke();
        }
    }

    /// Everything the page holds on to
    struct App {
        session: Session<LocalStorage>,
        fx: FxEngine,
        canvas: Option<Canvas2d>,
    }

    type Shared = Rc<RefCell<App>>;

    fn document() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    fn viewport() -> (f32, f32) {
        let window = web_sys::window().unwrap();
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(1280.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(720.0);
        (w as f32, h as f32)
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn show(name: &str) {
        let document = document();
        for id in SCREENS {
            if let Some(el) = document.get_element_by_id(id) {
                let _ = el.class_list().remove_1("active");
            }
        }
        if let Some(el) = document.get_element_by_id(name) {
            let _ = el.class_list().add_1("active");
        }
    }

    fn set_display(id: &str, visible: bool) {
        if let Some(el) = document().get_element_by_id(id) {
            let style = if visible { "display:inline-block" } else { "display:none" };
            let _ = el.set_attribute("style", style);
        }
    }

    fn set_hands_disabled(disabled: bool) {
        if let Ok(list) = document().query_selector_all("[data-hand]") {
            for i in 0..list.length() {
                if let Some(btn) = list.get(i).and_then(|n| n.dyn_into::<HtmlButtonElement>().ok()) {
                    btn.set_disabled(disabled);
                }
            }
        }
    }

    fn open_modal(open: bool) {
        if let Some(modal) = document().get_element_by_id("modal") {
            let _ = if open {
                modal.class_list().add_1("open")
            } else {
                modal.class_list().remove_1("open")
            };
            let _ = modal.set_attribute("aria-hidden", if open { "false" } else { "true" });
        }
    }

    fn update_hud(app: &App) {
        if let Some(run) = app.session.run() {
            set_text("roundPill", &format!("Round: {}", run.round));
            set_text("rivalsLbl", &format_count(run.rivals));
            set_text("rankPreviewLbl", &format_count(run.rank_preview()));
            if let Some(el) = document().get_element_by_id("halvesLbl") {
                let opacity = if run.rivals > 0 { "opacity:1" } else { "opacity:0.5" };
                let _ = el.set_attribute("style", opacity);
            }
        }
    }

    fn refresh_best(app: &App, newly: Option<&str>) {
        let records = app.session.records();
        match records.best_record {
            Some(rec) => set_text(
                "bestRankLbl",
                &format!("{} players: Rank {}", format_count(rec.total), format_count(rec.rank)),
            ),
            None => set_text("bestRankLbl", "—"),
        }
        match records.best_round {
            Some(round) => set_text("bestRoundLbl", &format_count(u64::from(round))),
            None => set_text("bestRoundLbl", "—"),
        }

        let Some(list) = document().get_element_by_id("badgeList") else {
            return;
        };
        let badges = records.badges_in_order();
        if badges.is_empty() {
            list.set_text_content(Some("None"));
            return;
        }
        let html: String = badges
            .iter()
            .map(|tier| {
                let celebrate = if newly == Some(tier.title()) { " celebrate" } else { "" };
                format!(
                    "<div class=\"badge-line sparkle{}\" data-badge=\"{}\">{}</div>",
                    celebrate,
                    tier.title(),
                    tier.title()
                )
            })
            .collect();
        list.set_inner_html(&html);
    }

    fn burst(app: &Shared, x: f32, y: f32, n: usize, power: f32, life_scale: f32) {
        let started = {
            let mut a = app.borrow_mut();
            let n = a.session.settings().confetti_count(n);
            if n == 0 {
                return;
            }
            a.fx.spawn_confetti(x, y, n, power, life_scale)
        };
        if started {
            request_frame(app.clone());
        }
    }

    fn ripple(app: &Shared, x: Option<f32>, y: Option<f32>) {
        let started = {
            let mut a = app.borrow_mut();
            if !a.session.settings().effective_effects() {
                return;
            }
            a.fx.ripple(x, y)
        };
        if started {
            request_frame(app.clone());
        }
    }

    fn request_frame(app: Shared) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |_time: f64| {
            fx_loop(app);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn fx_loop(app: Shared) {
        let again = {
            let mut guard = app.borrow_mut();
            let a = &mut *guard;
            let again = a.fx.tick();
            if let Some(canvas) = a.canvas.as_mut() {
                a.fx.render(canvas);
            }
            again
        };
        if again {
            request_frame(app);
        }
    }

    fn after(ms: i32, f: impl FnOnce() + 'static) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(f);
        let _ = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(closure.as_ref().unchecked_ref(), ms);
        closure.forget();
    }

    fn start_run(app: &Shared) {
        open_modal(false);
        let population = document()
            .get_element_by_id("population")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .and_then(|input| input.value().trim().parse::<u64>().ok())
            .unwrap_or(100);
        {
            let mut a = app.borrow_mut();
            a.session.start_run(population);
            update_hud(&a);
        }
        set_text("lastInfo", "");
        set_hands_disabled(false);
        show("screen-game");
        ripple(app, None, None);
    }

    fn return_to_setup(app: &Shared) {
        open_modal(false);
        app.borrow_mut().session.return_to_setup();
        show("screen-setup");
    }

    fn open_round_modal(result: &RoundResult, tier: Tier) {
        if let Some(banner) = document().get_element_by_id("roundBanner") {
            let class = match result.outcome {
                Outcome::Win | Outcome::Victory => "result win",
                Outcome::Lose => "result lose",
                Outcome::Draw => "result draw",
            };
            let _ = banner.set_attribute("class", class);
            let _ = banner.set_attribute("style", "display:block");
            let extra = if result.outcome == Outcome::Victory {
                format!(" → <b>{}</b>", tier.title())
            } else {
                String::new()
            };
            banner.set_inner_html(&format!(
                "Result: <b>{}</b><br>Opponent: {} {} ／ Remaining Rivals: <b>{}</b>{}",
                result.outcome.as_str(),
                result.opponent.emoji(),
                result.opponent,
                format_count(result.rivals),
                extra
            ));
        }
        set_display("nextRoundBtn", result.outcome == Outcome::Win);
        set_display("toResultBtn", result.outcome == Outcome::Lose);
        set_display("toVictoryBtn", result.outcome == Outcome::Victory);
        open_modal(true);
    }

    fn play(app: &Shared, hand: Hand) {
        let Some(result) = app.borrow_mut().session.play_hand(hand) else {
            return;
        };
        let (size, total) = {
            let a = app.borrow();
            (a.fx.viewport(), a.session.run().map_or(1, |run| run.total))
        };
        let (w, h) = (size.x, size.y);

        match result.outcome {
            Outcome::Draw => {
                set_text(
                    "lastInfo",
                    &format!("— Draw (Opponent: {}{})", result.opponent.emoji(), result.opponent),
                );
                ripple(app, Some(w / 2.0), Some(h * 0.35));
                return;
            }
            Outcome::Win => {
                update_hud(&app.borrow());
                burst(app, w / 2.0, h * 0.28, 140, 7.0, 0.5);
            }
            Outcome::Victory => {
                update_hud(&app.borrow());
                set_hands_disabled(true);
            }
            Outcome::Lose => {}
        }
        open_round_modal(&result, Tier::for_total(total));
    }

    fn go_next_round(app: &Shared) {
        open_modal(false);
        update_hud(&app.borrow());
        set_text("lastInfo", "— Choose your next move");
    }

    fn go_result(app: &Shared) {
        open_modal(false);
        let Some(summary) = app.borrow_mut().session.finalize_loss() else {
            return;
        };
        set_text("finalRankLbl", &format_count(summary.final_rank));
        set_text("reachRoundLbl", &format_count(u64::from(summary.round)));
        set_text("totalLbl", &format_count(summary.total));
        set_text(
            "finalNarrative",
            &format!(
                "That day, you were not chosen as the strongest human. But finishing {} out of {} is still your achievement.",
                format_count(summary.final_rank),
                format_count(summary.total)
            ),
        );
        refresh_best(&app.borrow(), None);
        show("screen-result");
    }

    fn go_victory(app: &Shared) {
        open_modal(false);
        let Some(summary) = app.borrow_mut().session.finalize_victory() else {
            return;
        };
        set_text("victoryTitle", summary.copy.title);
        set_text("victoryRankLbl", "1");
        set_text("victoryRoundLbl", &format_count(u64::from(summary.round)));
        set_text("victoryTotalLbl", &format_count(summary.total));
        set_text("victoryNarrative", &summary.copy.message);
        let newly = summary.newly_earned.then(|| summary.tier.title());
        refresh_best(&app.borrow(), newly);
        show("screen-victory");

        let size = app.borrow().fx.viewport();
        let (w, h) = (size.x, size.y);
        burst(app, w * 0.20, h * 0.25, 220, 8.0, 1.6);
        let a = app.clone();
        after(120, move || burst(&a, w * 0.80, h * 0.25, 240, 8.0, 1.6));
        let a = app.clone();
        after(220, move || burst(&a, w * 0.50, h * 0.18, 260, 8.0, 1.6));
    }

    fn on_click(id: &str, app: &Shared, handler: fn(&Shared)) {
        if let Some(el) = document().get_element_by_id(id) {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                handler(&app);
            });
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_hand_buttons(app: &Shared) {
        let Ok(list) = document().query_selector_all("[data-hand]") else {
            return;
        };
        for i in 0..list.length() {
            let Some(btn) = list.get(i).and_then(|n| n.dyn_into::<HtmlButtonElement>().ok()) else {
                continue;
            };
            let Some(hand) = btn.get_attribute("data-hand").and_then(|s| Hand::from_str(&s)) else {
                log::warn!("Button with unknown data-hand ignored");
                continue;
            };
            let app = app.clone();
            let btn_clone = btn.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                // Debounce double taps
                btn_clone.set_disabled(true);
                let b = btn_clone.clone();
                after(150, move || b.set_disabled(false));
                play(&app, hand);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_canvas(app: &Shared) {
        let (w, h) = viewport();
        let canvas = document()
            .get_element_by_id("fx")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok());
        let Some(canvas) = canvas else {
            log::warn!("No #fx canvas - effects disabled");
            return;
        };
        canvas.set_width(w as u32);
        canvas.set_height(h as u32);
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|obj| obj.dyn_into::<CanvasRenderingContext2d>().ok());

        let mut a = app.borrow_mut();
        a.fx.resize(w, h);
        a.canvas = ctx.map(|ctx| Canvas2d { ctx });

        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (w, h) = viewport();
            canvas.set_width(w as u32);
            canvas.set_height(h as u32);
            app.borrow_mut().fx.resize(w, h);
        });
        let _ = web_sys::window()
            .unwrap()
            .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
        log::info!("RPS Gauntlet starting...");

        let seed = js_sys::Date::now() as u64;
        let mut session = Session::new(LocalStorage::new(), seed);

        let query = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        if !query.is_empty() {
            session.apply_query(&query);
        }

        if let Some(total) = session.last_total() {
            if let Some(input) = document()
                .get_element_by_id("population")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            {
                input.set_value(&total.to_string());
            }
        }

        let app: Shared = Rc::new(RefCell::new(App {
            session,
            fx: FxEngine::new(seed ^ 0x9E37_79B9_7F4A_7C15),
            canvas: None,
        }));

        setup_canvas(&app);
        refresh_best(&app.borrow(), None);
        show("screen-setup");

        on_click("startBtn", &app, start_run);
        on_click("nextRoundBtn", &app, go_next_round);
        on_click("toResultBtn", &app, go_result);
        on_click("toVictoryBtn", &app, go_victory);
        on_click("retryBtn", &app, return_to_setup);
        on_click("victoryRetryBtn", &app, return_to_setup);
        setup_hand_buttons(&app);

        log::info!("RPS Gauntlet ready!");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("RPS Gauntlet (native) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let population = args
        .iter()
        .find_map(|a| a.parse::<u64>().ok())
        .unwrap_or(100);
    let force_win = args.iter().any(|a| a == "--force-win");

    if let Err(e) = console::play(population, force_win) {
        log::error!("Console game failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod console {
    use std::io::{self, BufRead, Write};
    use std::time::{SystemTime, UNIX_EPOCH};

    use rps_gauntlet::game::Hand;
    use rps_gauntlet::session::Phase;
    use rps_gauntlet::{MemoryStore, Session, format_count};

    /// Play one run on stdin/stdout
    pub fn play(population: u64, force_win: bool) -> io::Result<()> {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let mut session = Session::new(MemoryStore::new(), seed);
        session.set_force_win(force_win);
        session.start_run(population);

        let stdin = io::stdin();
        let mut out = io::stdout();
        writeln!(out, "{} players. Throw rock, paper or scissors (r/p/s).", format_count(population))?;

        let mut lines = stdin.lock().lines();
        while session.phase() == Phase::Running {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = lines.next() else {
                writeln!(out)?;
                return Ok(());
            };
            let Some(hand) = Hand::from_str(&line?) else {
                writeln!(out, "Unknown hand, try r/p/s")?;
                continue;
            };
            let Some(result) = session.play_hand(hand) else {
                break;
            };
            writeln!(
                out,
                "{} vs {} {}: {} (rivals left {})",
                hand.emoji(),
                result.opponent.emoji(),
                result.opponent,
                result.outcome.as_str(),
                format_count(result.rivals)
            )?;
            if result.outcome.is_terminal() {
                break;
            }
        }

        match session.phase() {
            Phase::Victory => {
                if let Some(summary) = session.finalize_victory() {
                    writeln!(out, "{}\n{}", summary.copy.title, summary.copy.message)?;
                }
            }
            Phase::Defeated => {
                if let Some(summary) = session.finalize_loss() {
                    writeln!(
                        out,
                        "Knocked out in round {}. Final rank {} of {}.",
                        summary.round,
                        format_count(summary.final_rank),
                        format_count(summary.total)
                    )?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

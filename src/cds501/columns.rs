//! CDS501 の列定義 (152列)

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    Int,
    Decimal,
    Flag,
    Text,
}

use ColumnType::*;

pub const COLUMN_COUNT: usize = 152;

/// 列名と型 (出現順)
///
/// 車両と当事者の区画で `cmpss_dir_from_cd` / `cmpss_dir_to_cd` / `actn_cd` が重複する。
pub const COLUMNS: [(&str, ColumnType); COLUMN_COUNT] = [
    ("crash_id", Int),
    ("rec_typ_cd", Text),
    ("vhcl_id", Int),
    ("partic_id", Int),
    ("partic_dsply_seq_no", Int),
    ("vhcl_coded_seq_no", Int),
    ("partic_vhcl_seq_no", Int),
    ("ser_no", Text),
    ("crash_mo_no", Text),
    ("crash_day_no", Text),
    ("crash_yr_no", Text),
    ("crash_wk_day_cd", Text),
    ("crash_hr_no", Text),
    ("cnty_id", Text),
    ("city_sect_id", Int),
    ("urb_area_cd", Int),
    ("fc_cd", Text),
    ("nhs_flg", Flag),
    ("hwy_no", Text),
    ("hwy_sfx_no", Text),
    ("rdwy_no", Text),
    ("hwy_compnt_cd", Text),
    ("mlge_typ_cd", Text),
    ("rd_con_no", Text),
    ("lrs_val", Text),
    ("lat_deg_no", Int),
    ("lat_minute_no", Int),
    ("lat_sec_no", Decimal),
    ("longtd_deg_no", Int),
    ("longtd_minute_no", Int),
    ("longtd_sec_no", Decimal),
    ("specl_jrsdct_id", Text),
    ("jrsdct_grp_cd", Text),
    ("agy_st_no", Text),
    ("isect_agy_st_no", Text),
    ("isect_seq_no", Int),
    ("from_isect_dstnc_qty", Int),
    ("cmpss_dir_cd", Text),
    ("mp_no", Decimal),
    ("post_speed_lmt_val", Text),
    ("rd_char_cd", Text),
    ("off_rdwy_flg", Flag),
    ("isect_typ_cd", Text),
    ("isect_rel_flg", Flag),
    ("rndabt_flg", Flag),
    ("drvwy_rel_flg", Flag),
    ("ln_qty", Int),
    ("turng_leg_qty", Int),
    ("medn_typ_cd", Text),
    ("impct_loc_cd", Text),
    ("crash_typ_cd", Text),
    ("collis_typ_cd", Text),
    ("crash_svrty_cd", Text),
    ("wthr_cond_cd", Text),
    ("rd_surf_cond_cd", Text),
    ("lgt_cond_cd", Text),
    ("traf_cntl_device_cd", Text),
    ("traf_cntl_func_flg", Flag),
    ("invstg_agy_cd", Text),
    ("crash_evnt_1_cd", Text),
    ("crash_evnt_2_cd", Text),
    ("crash_evnt_3_cd", Text),
    ("crash_cause_1_cd", Text),
    ("crash_cause_2_cd", Text),
    ("crash_cause_3_cd", Text),
    ("schl_zone_ind", Text),
    ("wrk_zone_ind", Text),
    ("alchl_invlv_flg", Flag),
    ("drug_invlv_flg", Flag),
    ("crash_speed_invlv_flg", Flag),
    ("crash_hit_run_flg", Flag),
    ("pop_rng_cd", Text),
    ("rd_cntl_cd", Text),
    ("rte_typ_cd", Text),
    ("rte_id", Text),
    ("reg_id", Text),
    ("dist_id", Text),
    ("seg_mrk_id", Text),
    ("seg_pt_lrs_meas", Decimal),
    ("unloct_flg", Flag),
    ("tot_vhcl_cnt", Int),
    ("tot_fatal_cnt", Int),
    ("tot_inj_lvl_a_cnt", Int),
    ("tot_inj_lvl_b_cnt", Int),
    ("tot_inj_lvl_c_cnt", Int),
    ("tot_inj_cnt", Int),
    ("tot_uninjd_age00_04_cnt", Int),
    ("tot_uninjd_per_cnt", Int),
    ("tot_ped_cnt", Int),
    ("tot_ped_fatal_cnt", Int),
    ("tot_ped_inj_cnt", Int),
    ("tot_pedcycl_cnt", Int),
    ("tot_pedcycl_fatal_cnt", Int),
    ("tot_pedcycl_inj_cnt", Int),
    ("tot_unknwn_cnt", Int),
    ("tot_unknwn_fatal_cnt", Int),
    ("tot_unknwn_inj_cnt", Int),
    ("tot_occup_cnt", Int),
    ("tot_per_invlv_cnt", Int),
    ("tot_sfty_equip_used_qty", Int),
    ("tot_sfty_equip_unused_qty", Int),
    ("tot_sfty_equip_use_unknown_qty", Int),
    ("vhcl_ownshp_cd", Text),
    ("vhcl_use_cd", Text),
    ("vhcl_typ_cd", Text),
    ("emrgcy_vhcl_use_flg", Flag),
    ("trlr_qty", Int),
    ("vhcl_mvmnt_cd", Text),
    ("cmpss_dir_from_cd", Text),
    ("cmpss_dir_to_cd", Text),
    ("actn_cd", Text),
    ("vhcl_cause_1_cd", Text),
    ("vhcl_cause_2_cd", Text),
    ("vhcl_cause_3_cd", Text),
    ("vhcl_evnt_1_cd", Text),
    ("vhcl_evnt_2_cd", Text),
    ("vhcl_evnt_3_cd", Text),
    ("vhcl_speed_flg", Flag),
    ("vhcl_hit_run_flg", Flag),
    ("vhcl_sfty_equip_used_qty", Int),
    ("vhcl_sfty_equip_unused_qty", Int),
    ("vhcl_sfty_equip_use_unknwn_qty", Int),
    ("vhcl_occup_cnt", Int),
    ("strikg_vhcl_flg", Flag),
    ("partic_typ_cd", Text),
    ("partic_hit_run_flg", Flag),
    ("pub_empl_flg", Flag),
    ("sex_cd", Text),
    ("age_val", Text),
    ("drvr_lic_stat_cd", Text),
    ("drvr_res_stat_cd", Text),
    ("inj_svrty_cd", Text),
    ("sfty_equip_use_cd", Text),
    ("airbag_deploy_ind", Text),
    ("mvmnt_cd", Text),
    ("cmpss_dir_from_cd", Text),
    ("cmpss_dir_to_cd", Text),
    ("non_motrst_loc_cd", Text),
    ("actn_cd", Text),
    ("partic_err_1_cd", Text),
    ("partic_err_2_cd", Text),
    ("partic_err_3_cd", Text),
    ("partic_cause_1_cd", Text),
    ("partic_cause_2_cd", Text),
    ("partic_cause_3_cd", Text),
    ("partic_evnt_1_cd", Text),
    ("partic_evnt_2_cd", Text),
    ("partic_evnt_3_cd", Text),
    ("bac_val", Text),
    ("alchl_use_rpt_ind", Text),
    ("drug_use_rpt_ind", Text),
    ("strikg_partic_flg", Flag),
];

/// レコード種別の列
pub const RECORD_TYPE: usize = 1;

/// 事故レコードの列: crash_id + ser_no..tot_sfty_equip_use_unknown_qty
pub fn crash_indices() -> impl Iterator<Item = usize> {
    std::iter::once(0).chain(7..=101)
}

/// 車両レコードの列: crash_id, vhcl_id, vhcl_coded_seq_no + vhcl_ownshp_cd..strikg_vhcl_flg
pub fn vehicle_indices() -> impl Iterator<Item = usize> {
    [0, 2, 5].into_iter().chain(102..=123)
}

/// 当事者レコードの列: ID群 + partic_typ_cd..strikg_partic_flg
pub fn participant_indices() -> impl Iterator<Item = usize> {
    [0, 2, 3, 4, 5, 6].into_iter().chain(124..COLUMN_COUNT)
}

pub fn position(name: &str) -> Option<usize> {
    COLUMNS.iter().position(|(column, _)| *column == name)
}
